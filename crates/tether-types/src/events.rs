use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{RequestId, RequestSource, RequestStatus, UserId};

/// Bumped whenever a field is added to or removed from an event payload.
pub const EVENT_SCHEMA_VERSION: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlacklistAction {
    Add,
    Remove,
}

/// Relationship changes fanned out to a user's connected devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RelationEvent {
    /// Sent to the recipient of a new request
    FriendRequestReceived {
        request_id: RequestId,
        from_user: UserId,
        message: String,
        source: RequestSource,
        created_at: DateTime<Utc>,
    },

    /// Sent to the original sender once the recipient decides
    FriendRequestHandled {
        request_id: RequestId,
        status: RequestStatus,
        handled_at: DateTime<Utc>,
    },

    /// Sent to the peer of a removed friendship
    FriendRemoved {
        user_id: UserId,
        removed_at: DateTime<Utc>,
    },

    /// Sent to the owner's own devices
    FriendRemarkUpdated {
        peer: UserId,
        remark: String,
        updated_at: DateTime<Utc>,
    },

    /// Sent to the owner's own devices
    BlacklistChanged {
        action: BlacklistAction,
        target: UserId,
        changed_at: DateTime<Utc>,
    },
}

impl RelationEvent {
    /// Wire name of the event kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FriendRequestReceived { .. } => "friend_request_received",
            Self::FriendRequestHandled { .. } => "friend_request_handled",
            Self::FriendRemoved { .. } => "friend_removed",
            Self::FriendRemarkUpdated { .. } => "friend_remark_updated",
            Self::BlacklistChanged { .. } => "blacklist_changed",
        }
    }
}

/// Frames sent over the WebSocket gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GatewayFrame {
    /// Server confirms the device session is registered
    Ready { user_id: Uuid, session_id: Uuid, version: u16 },

    /// A relationship event for the session's user
    Event { version: u16, event: RelationEvent },
}

impl GatewayFrame {
    pub fn event(event: RelationEvent) -> Self {
        Self::Event {
            version: EVENT_SCHEMA_VERSION,
            event,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("all {0} session(s) for the target user are closed")]
    SessionsClosed(usize),
    #[error("publisher unavailable: {0}")]
    Unavailable(String),
}

/// Fire-and-forget delivery of an event to every active session of `target`.
///
/// Implementations must not block on the recipient. A target with no
/// sessions is not an error; delivery is best-effort.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, target: UserId, event: RelationEvent) -> Result<(), PublishError>;
}
