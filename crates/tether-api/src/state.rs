use std::sync::Arc;

use tether_gateway::Dispatcher;
use tether_relations::{QueryFacade, RelationshipEngine};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub engine: RelationshipEngine,
    pub queries: QueryFacade,
    pub dispatcher: Dispatcher,
}
