use tracing::{info, warn};

use tether_db::friendships;
use tether_types::api::FriendCheck;
use tether_types::events::RelationEvent;
use tether_types::models::UserId;

use super::RelationshipEngine;
use crate::error::{RelationError, check_remark};

impl RelationshipEngine {
    /// Remove both directions of the friendship in one transaction.
    pub fn remove_friend(&self, owner: UserId, peer: UserId) -> Result<(), RelationError> {
        let now = self.db.with_tx(|tx| -> Result<_, RelationError> {
            if !friendships::is_friend(tx, owner, peer)? {
                return Err(RelationError::NotFriends);
            }
            let now = friendships::next_stamp(tx)?;
            let removed = friendships::remove_pair(tx, owner, peer, now)?;
            if removed != 2 {
                warn!(
                    "Friendship {} <-> {} had {} active row(s), expected 2",
                    owner, peer, removed
                );
            }
            Ok(now)
        })?;

        info!("Friendship removed: {} -> {}", owner, peer);

        self.publish(
            peer,
            RelationEvent::FriendRemoved {
                user_id: owner,
                removed_at: now,
            },
        );
        Ok(())
    }

    /// Set the owner's private remark for `peer`. The peer's row is untouched.
    pub fn update_remark(
        &self,
        owner: UserId,
        peer: UserId,
        remark: &str,
    ) -> Result<(), RelationError> {
        check_remark(remark)?;

        let Some(now) = self.db.update_remark(owner, peer, remark)? else {
            return Err(RelationError::NotFriends);
        };

        info!("Remark updated: {} -> {}", owner, peer);

        // Other devices of the owner, not the peer
        self.publish(
            owner,
            RelationEvent::FriendRemarkUpdated {
                peer,
                remark: remark.to_string(),
                updated_at: now,
            },
        );
        Ok(())
    }

    pub fn is_friend(&self, owner: UserId, peer: UserId) -> Result<bool, RelationError> {
        Ok(self.db.is_friend(owner, peer)?)
    }

    /// Each peer is looked up on its own; a failed lookup reports `false`
    /// for that peer instead of failing the batch.
    pub fn batch_is_friend(&self, owner: UserId, peers: &[UserId]) -> Vec<FriendCheck> {
        peers
            .iter()
            .map(|&peer| {
                let is_friend = self.db.is_friend(owner, peer).unwrap_or_else(|e| {
                    warn!("Friend lookup {} -> {} failed: {}", owner, peer, e);
                    false
                });
                FriendCheck { peer, is_friend }
            })
            .collect()
    }
}
