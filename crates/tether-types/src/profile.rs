use serde::{Deserialize, Serialize};

use crate::models::UserId;

/// Display data owned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefProfile {
    pub user_id: UserId,
    pub nickname: String,
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("profile not found for {0}")]
    NotFound(UserId),
    #[error("profile lookup timed out after {0} ms")]
    Timeout(u64),
    #[error("profile service unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of a user's brief profile. Called once per list item; callers
/// treat every error as "no profile".
pub trait ProfileResolver: Send + Sync {
    fn resolve(&self, user_id: UserId) -> Result<BriefProfile, ResolveError>;
}

/// Resolver used when no profile service is configured.
pub struct NoProfiles;

impl ProfileResolver for NoProfiles {
    fn resolve(&self, _user_id: UserId) -> Result<BriefProfile, ResolveError> {
        Err(ResolveError::Unavailable("no profile service configured".into()))
    }
}
