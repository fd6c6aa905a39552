use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::DateTime;

use tether_types::api::{BatchCheckBody, FriendListQuery, IsFriendResponse, UpdateRemarkBody};
use tether_types::models::UserId;

use crate::error::{ApiError, blocking};
use crate::middleware::Caller;
use crate::state::AppState;

/// GET /friends?since=<unix-ms>
pub async fn list_friends(
    State(state): State<AppState>,
    Query(query): Query<FriendListQuery>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let since = query
        .since
        .map(|ms| {
            DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| ApiError::BadRequest(format!("invalid since timestamp {}", ms)))
        })
        .transpose()?;

    let queries = state.queries.clone();
    let listing = blocking(move || queries.friend_list(caller.user_id, since)).await?;

    Ok(Json(listing))
}

/// GET /friends/{peer}
pub async fn is_friend(
    State(state): State<AppState>,
    Path(peer): Path<UserId>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    let is_friend = blocking(move || engine.is_friend(caller.user_id, peer)).await?;

    Ok(Json(IsFriendResponse { is_friend }))
}

/// POST /friends/check
pub async fn batch_is_friend(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<BatchCheckBody>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    let checks = blocking(move || Ok(engine.batch_is_friend(caller.user_id, &req.peers))).await?;

    Ok(Json(checks))
}

/// DELETE /friends/{peer}
pub async fn remove_friend(
    State(state): State<AppState>,
    Path(peer): Path<UserId>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    blocking(move || engine.remove_friend(caller.user_id, peer)).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /friends/{peer}/remark
pub async fn update_remark(
    State(state): State<AppState>,
    Path(peer): Path<UserId>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<UpdateRemarkBody>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    blocking(move || engine.update_remark(caller.user_id, peer, &req.remark)).await?;

    Ok(StatusCode::NO_CONTENT)
}
