//! Write side of the relationship graph.
//!
//! The engine is a stateless handle: it owns nothing but shared references to
//! the store and the publisher, so one instance can be cloned into every
//! request handler. Invariants that span rows are enforced inside the store's
//! transactional scope; event publishing happens only after the store call
//! returns and never changes the outcome.

mod blocks;
mod friends;
mod requests;

use std::sync::Arc;

use tracing::warn;

use tether_db::Database;
use tether_types::events::{EventPublisher, RelationEvent};
use tether_types::models::UserId;

#[derive(Clone)]
pub struct RelationshipEngine {
    db: Arc<Database>,
    publisher: Arc<dyn EventPublisher>,
}

impl RelationshipEngine {
    pub fn new(db: Arc<Database>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { db, publisher }
    }

    /// Best-effort fan-out; failures are logged and swallowed.
    fn publish(&self, target: UserId, event: RelationEvent) {
        let name = event.name();
        if let Err(e) = self.publisher.publish(target, event) {
            warn!("Failed to publish {} to {}: {}", name, target, e);
        }
    }
}
