use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    BlockEntry, FriendRequest, Friendship, RequestAction, RequestDirection, RequestId,
    RequestSource, UserId,
};
use crate::profile::BriefProfile;

// -- Friend requests --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendRequestBody {
    pub to_user: UserId,
    #[serde(default)]
    pub message: String,
    pub source: RequestSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequestResponse {
    pub request_id: RequestId,
    pub auto_accepted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandleRequestBody {
    pub action: RequestAction,
}

#[derive(Debug, Deserialize)]
pub struct RequestListQuery {
    pub direction: RequestDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestView {
    #[serde(flatten)]
    pub request: FriendRequest,
    /// Profile of the other party; `None` when the lookup failed.
    pub profile: Option<BriefProfile>,
}

// -- Friends --

#[derive(Debug, Deserialize)]
pub struct FriendListQuery {
    /// Unix milliseconds of the client's last sync.
    pub since: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendView {
    #[serde(flatten)]
    pub friendship: Friendship,
    pub profile: Option<BriefProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendListResponse {
    pub friends: Vec<FriendView>,
    /// Unix millis; pass back as `since` on the next incremental sync.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRemarkBody {
    pub remark: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchCheckBody {
    pub peers: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendCheck {
    pub peer: UserId,
    pub is_friend: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsFriendResponse {
    pub is_friend: bool,
}

// -- Blocks --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockBody {
    pub target: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockView {
    #[serde(flatten)]
    pub entry: BlockEntry,
    pub profile: Option<BriefProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsBlockedResponse {
    pub is_blocked: bool,
}

// -- Errors --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
