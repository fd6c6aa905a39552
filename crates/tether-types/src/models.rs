use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type RequestId = i64;

/// Longest accepted friend request message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Longest accepted friendship remark, in characters.
pub const MAX_REMARK_CHARS: usize = 50;

/// Returned by the `FromStr` impls below when a stored value is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Where the sender found the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestSource {
    Search,
    Qrcode,
    Group,
    Contacts,
}

impl RequestSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Qrcode => "qrcode",
            Self::Group => "group",
            Self::Contacts => "contacts",
        }
    }
}

impl FromStr for RequestSource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(Self::Search),
            "qrcode" => Ok(Self::Qrcode),
            "group" => Ok(Self::Group),
            "contacts" => Ok(Self::Contacts),
            other => Err(UnknownVariant {
                kind: "request source",
                value: other.to_string(),
            }),
        }
    }
}

/// Friend request lifecycle. `Expired` is reserved for a timer-driven
/// collaborator and is never assigned here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "expired" => Ok(Self::Expired),
            other => Err(UnknownVariant {
                kind: "request status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Active,
    Removed,
}

impl FriendshipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Removed => "removed",
        }
    }
}

impl FromStr for FriendshipStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "removed" => Ok(Self::Removed),
            other => Err(UnknownVariant {
                kind: "friendship status",
                value: other.to_string(),
            }),
        }
    }
}

/// The recipient's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Accept,
    Reject,
}

impl RequestAction {
    /// Terminal status a pending request moves to under this action.
    pub fn target_status(self) -> RequestStatus {
        match self {
            Self::Accept => RequestStatus::Accepted,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

/// Which side of the request list a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestDirection {
    Sent,
    Received,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: RequestId,
    pub from_user: UserId,
    pub to_user: UserId,
    pub message: String,
    pub source: RequestSource,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FriendRequest {
    /// The other party from `user`'s point of view.
    pub fn counterparty(&self, user: UserId) -> UserId {
        if self.from_user == user {
            self.to_user
        } else {
            self.from_user
        }
    }
}

/// One direction of a friendship. Every row has a mirror with owner and peer swapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    pub id: i64,
    pub owner: UserId,
    pub peer: UserId,
    pub remark: String,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    pub fn is_active(&self) -> bool {
        self.status == FriendshipStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    pub id: i64,
    pub owner: UserId,
    pub blocked: UserId,
    pub created_at: DateTime<Utc>,
}

/// Current time truncated to millisecond precision, matching what the store persists.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
