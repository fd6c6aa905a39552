use tracing::{debug, info};

use tether_db::{blocks, friendships, requests};
use tether_types::api::SendRequestResponse;
use tether_types::events::RelationEvent;
use tether_types::models::{
    FriendRequest, RequestAction, RequestId, RequestSource, RequestStatus, UserId, now_millis,
};

use super::RelationshipEngine;
use crate::error::{RelationError, check_message};

impl RelationshipEngine {
    /// Create a pending request from `from` to `to`.
    ///
    /// Checks run in a fixed order and the first failure wins: self-target,
    /// message length, block in either direction, existing friendship, pending
    /// request in either direction. The checks and the insert share one
    /// transaction.
    pub fn send_request(
        &self,
        from: UserId,
        to: UserId,
        message: &str,
        source: RequestSource,
    ) -> Result<SendRequestResponse, RelationError> {
        if from == to {
            return Err(RelationError::CannotTargetSelf);
        }
        check_message(message)?;

        let (request_id, now) = self.db.with_tx(|tx| -> Result<_, RelationError> {
            if blocks::is_blocked_either(tx, from, to)? {
                return Err(RelationError::Blocked);
            }
            if friendships::is_friend(tx, from, to)? {
                return Err(RelationError::AlreadyFriends);
            }
            if requests::pending_between(tx, from, to)? {
                return Err(RelationError::RequestAlreadyPending);
            }

            let now = now_millis();
            let id = requests::insert_request(tx, from, to, message, source, now).map_err(|e| {
                if e.is_unique_violation() {
                    RelationError::RequestAlreadyPending
                } else {
                    RelationError::from(e)
                }
            })?;
            Ok((id, now))
        })?;

        info!("Friend request {} sent: {} -> {}", request_id, from, to);

        self.publish(
            to,
            RelationEvent::FriendRequestReceived {
                request_id,
                from_user: from,
                message: message.to_string(),
                source,
                created_at: now,
            },
        );

        Ok(SendRequestResponse {
            request_id,
            auto_accepted: false,
        })
    }

    /// Accept or reject a pending request on behalf of its recipient.
    ///
    /// Accepting flips the status and writes both friendship rows in one
    /// transaction. The status change is a compare-and-swap on `pending`, so
    /// of two concurrent accepts exactly one wins and the other sees
    /// `AlreadyProcessed`.
    pub fn handle_request(
        &self,
        acting: UserId,
        request_id: RequestId,
        action: RequestAction,
    ) -> Result<FriendRequest, RelationError> {
        let (mut request, now) = match action {
            RequestAction::Accept => self.db.with_tx(|tx| -> Result<_, RelationError> {
                let request = requests::get_request(tx, request_id)?
                    .ok_or(RelationError::NotFound)?;
                check_handleable(&request, acting)?;

                // Stamped under the write lock: friend-list sync orders by it
                let now = friendships::next_stamp(tx)?;
                if !requests::transition_request(tx, request_id, RequestStatus::Accepted, now)? {
                    return Err(RelationError::AlreadyProcessed);
                }
                friendships::activate_pair(tx, request.to_user, request.from_user, now)?;
                Ok((request, now))
            })?,
            RequestAction::Reject => {
                let request = self
                    .db
                    .get_request(request_id)?
                    .ok_or(RelationError::NotFound)?;
                check_handleable(&request, acting)?;

                let now = now_millis();
                if !self
                    .db
                    .transition_request(request_id, RequestStatus::Rejected, now)?
                {
                    debug!("Request {} resolved concurrently", request_id);
                    return Err(RelationError::AlreadyProcessed);
                }
                (request, now)
            }
        };

        request.status = action.target_status();
        request.updated_at = now;

        info!(
            "Friend request {} {} by {}",
            request_id,
            request.status.as_str(),
            acting
        );

        self.publish(
            request.from_user,
            RelationEvent::FriendRequestHandled {
                request_id,
                status: request.status,
                handled_at: now,
            },
        );

        Ok(request)
    }
}

/// Recipient-only, pending-only. Permission is checked before status.
fn check_handleable(request: &FriendRequest, acting: UserId) -> Result<(), RelationError> {
    if request.to_user != acting {
        return Err(RelationError::PermissionDenied);
    }
    if request.status.is_terminal() {
        return Err(RelationError::AlreadyProcessed);
    }
    Ok(())
}
