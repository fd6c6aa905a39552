//! Read-side list assembly.
//!
//! Lists come from the store in one query; each item is then decorated with
//! the counterparty's profile. A failed lookup leaves `profile` empty for that
//! item and never fails the list.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use tether_db::Database;
use tether_types::api::{BlockView, FriendListResponse, FriendView, RequestView};
use tether_types::models::{RequestDirection, UserId};
use tether_types::profile::{BriefProfile, ProfileResolver};

use crate::error::RelationError;

#[derive(Clone)]
pub struct QueryFacade {
    db: Arc<Database>,
    profiles: Arc<dyn ProfileResolver>,
}

impl QueryFacade {
    pub fn new(db: Arc<Database>, profiles: Arc<dyn ProfileResolver>) -> Self {
        Self { db, profiles }
    }

    /// Full active list, or every row changed after `since` for incremental
    /// sync. `synced_at` in the response is the `since` for the next call.
    pub fn friend_list(
        &self,
        owner: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<FriendListResponse, RelationError> {
        let listing = self.db.list_friends(owner, since)?;
        debug!(
            "Friend list for {}: {} row(s), since={:?}, synced_at={}",
            owner,
            listing.friends.len(),
            since,
            listing.synced_at
        );

        let mut lookup = ProfileLookup::new(self.profiles.as_ref());
        let friends = listing
            .friends
            .into_iter()
            .map(|friendship| FriendView {
                profile: lookup.get(friendship.peer),
                friendship,
            })
            .collect();

        Ok(FriendListResponse {
            friends,
            synced_at: listing.synced_at,
        })
    }

    pub fn requests(
        &self,
        user: UserId,
        direction: RequestDirection,
    ) -> Result<Vec<RequestView>, RelationError> {
        let rows = self.db.list_requests(user, direction)?;
        debug!("{:?} requests for {}: {} row(s)", direction, user, rows.len());

        let mut lookup = ProfileLookup::new(self.profiles.as_ref());
        Ok(rows
            .into_iter()
            .map(|request| RequestView {
                profile: lookup.get(request.counterparty(user)),
                request,
            })
            .collect())
    }

    pub fn block_list(&self, owner: UserId) -> Result<Vec<BlockView>, RelationError> {
        let rows = self.db.list_blocks(owner)?;
        debug!("Block list for {}: {} row(s)", owner, rows.len());

        let mut lookup = ProfileLookup::new(self.profiles.as_ref());
        Ok(rows
            .into_iter()
            .map(|entry| BlockView {
                profile: lookup.get(entry.blocked),
                entry,
            })
            .collect())
    }
}

/// Per-call memo so a user appearing on several rows is resolved once.
struct ProfileLookup<'a> {
    resolver: &'a dyn ProfileResolver,
    seen: HashMap<UserId, Option<BriefProfile>>,
}

impl<'a> ProfileLookup<'a> {
    fn new(resolver: &'a dyn ProfileResolver) -> Self {
        Self {
            resolver,
            seen: HashMap::new(),
        }
    }

    fn get(&mut self, user_id: UserId) -> Option<BriefProfile> {
        let resolver = self.resolver;
        self.seen
            .entry(user_id)
            .or_insert_with(|| match resolver.resolve(user_id) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!("Profile lookup for {} failed: {}", user_id, e);
                    None
                }
            })
            .clone()
    }
}
