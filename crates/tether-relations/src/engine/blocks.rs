use tracing::info;

use tether_db::blocks;
use tether_types::events::{BlacklistAction, RelationEvent};
use tether_types::models::{UserId, now_millis};

use super::RelationshipEngine;
use crate::error::RelationError;

impl RelationshipEngine {
    /// Existing friendships are left in place; callers that want them gone
    /// call `remove_friend` separately.
    pub fn block(&self, owner: UserId, target: UserId) -> Result<(), RelationError> {
        if owner == target {
            return Err(RelationError::CannotTargetSelf);
        }

        let now = self.db.with_tx(|tx| -> Result<_, RelationError> {
            if blocks::has_block(tx, owner, target)? {
                return Err(RelationError::AlreadyBlocked);
            }
            let now = now_millis();
            blocks::insert_block(tx, owner, target, now)?;
            Ok(now)
        })?;

        info!("{} blocked {}", owner, target);

        self.publish(
            owner,
            RelationEvent::BlacklistChanged {
                action: BlacklistAction::Add,
                target,
                changed_at: now,
            },
        );
        Ok(())
    }

    pub fn unblock(&self, owner: UserId, target: UserId) -> Result<(), RelationError> {
        if !self.db.delete_block(owner, target)? {
            return Err(RelationError::NotBlocked);
        }

        info!("{} unblocked {}", owner, target);

        self.publish(
            owner,
            RelationEvent::BlacklistChanged {
                action: BlacklistAction::Remove,
                target,
                changed_at: now_millis(),
            },
        );
        Ok(())
    }

    /// True when either user has blocked the other.
    pub fn is_blocked(&self, a: UserId, b: UserId) -> Result<bool, RelationError> {
        Ok(self.db.is_blocked(a, b)?)
    }
}
