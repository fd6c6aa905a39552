use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use tether_types::api::{BlockBody, IsBlockedResponse};
use tether_types::models::UserId;

use crate::error::{ApiError, blocking};
use crate::middleware::Caller;
use crate::state::AppState;

/// GET /blocks
pub async fn list_blocks(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let queries = state.queries.clone();
    let views = blocking(move || queries.block_list(caller.user_id)).await?;

    Ok(Json(views))
}

/// POST /blocks
pub async fn block(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<BlockBody>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    blocking(move || engine.block(caller.user_id, req.target)).await?;

    Ok(StatusCode::CREATED)
}

/// GET /blocks/{user}: whether either side has blocked the other.
pub async fn is_blocked(
    State(state): State<AppState>,
    Path(user): Path<UserId>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    let is_blocked = blocking(move || engine.is_blocked(caller.user_id, user)).await?;

    Ok(Json(IsBlockedResponse { is_blocked }))
}

/// DELETE /blocks/{user}
pub async fn unblock(
    State(state): State<AppState>,
    Path(user): Path<UserId>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    blocking(move || engine.unblock(caller.user_id, user)).await?;

    Ok(StatusCode::NO_CONTENT)
}
