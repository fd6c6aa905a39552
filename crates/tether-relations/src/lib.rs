pub mod engine;
pub mod error;
pub mod query;

pub use engine::RelationshipEngine;
pub use error::{ErrorCategory, RelationError};
pub use query::QueryFacade;
