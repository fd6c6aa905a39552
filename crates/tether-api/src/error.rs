use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use tether_relations::{ErrorCategory, RelationError};
use tether_types::api::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Relation(#[from] RelationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("internal error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Relation(e) => {
                let status = match e.category() {
                    ErrorCategory::Validation => StatusCode::BAD_REQUEST,
                    ErrorCategory::Conflict => StatusCode::CONFLICT,
                    ErrorCategory::Permission => StatusCode::FORBIDDEN,
                    ErrorCategory::NotFound => StatusCode::NOT_FOUND,
                    ErrorCategory::Dependency => {
                        error!("Relationship store failure: {}", e);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    "internal error".to_string()
                } else {
                    e.to_string()
                };
                (status, e.code(), message)
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad-request", msg.clone()),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "internal error".to_string(),
            ),
        };

        (
            status,
            Json(ErrorBody {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// Run a blocking engine or store call off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, RelationError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}
