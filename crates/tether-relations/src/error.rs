use tether_db::StoreError;
use tether_types::models::{MAX_MESSAGE_CHARS, MAX_REMARK_CHARS};

/// How a failure should be surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    Permission,
    NotFound,
    Dependency,
}

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("a user cannot target themselves")]
    CannotTargetSelf,

    #[error("request message exceeds 200 characters")]
    MessageTooLong,

    #[error("remark exceeds 50 characters")]
    RemarkTooLong,

    #[error("one of the users has blocked the other")]
    Blocked,

    #[error("users are already friends")]
    AlreadyFriends,

    #[error("a pending request already exists between these users")]
    RequestAlreadyPending,

    #[error("request has already been processed")]
    AlreadyProcessed,

    #[error("users are not friends")]
    NotFriends,

    #[error("user is already blocked")]
    AlreadyBlocked,

    #[error("user is not blocked")]
    NotBlocked,

    #[error("only the recipient may handle this request")]
    PermissionDenied,

    #[error("request not found")]
    NotFound,

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl RelationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CannotTargetSelf => "cannot-target-self",
            Self::MessageTooLong => "message-too-long",
            Self::RemarkTooLong => "remark-too-long",
            Self::Blocked => "blocked",
            Self::AlreadyFriends => "already-friends",
            Self::RequestAlreadyPending => "request-already-pending",
            Self::AlreadyProcessed => "already-processed",
            Self::NotFriends => "not-friends",
            Self::AlreadyBlocked => "already-blocked",
            Self::NotBlocked => "not-blocked",
            Self::PermissionDenied => "permission-denied",
            Self::NotFound => "not-found",
            Self::Store(_) => "internal",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CannotTargetSelf | Self::MessageTooLong | Self::RemarkTooLong => {
                ErrorCategory::Validation
            }
            Self::Blocked
            | Self::AlreadyFriends
            | Self::RequestAlreadyPending
            | Self::AlreadyProcessed
            | Self::NotFriends
            | Self::AlreadyBlocked
            | Self::NotBlocked => ErrorCategory::Conflict,
            Self::PermissionDenied => ErrorCategory::Permission,
            Self::NotFound => ErrorCategory::NotFound,
            Self::Store(_) => ErrorCategory::Dependency,
        }
    }
}

pub(crate) fn check_message(message: &str) -> Result<(), RelationError> {
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(RelationError::MessageTooLong);
    }
    Ok(())
}

pub(crate) fn check_remark(remark: &str) -> Result<(), RelationError> {
    if remark.chars().count() > MAX_REMARK_CHARS {
        return Err(RelationError::RemarkTooLong);
    }
    Ok(())
}
