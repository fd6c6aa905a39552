use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use tether_types::api::{HandleRequestBody, RequestListQuery, SendRequestBody};
use tether_types::models::RequestId;

use crate::error::{ApiError, blocking};
use crate::middleware::Caller;
use crate::state::AppState;

/// POST /friend-requests
pub async fn send_request(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<SendRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    let sent = blocking(move || {
        engine.send_request(caller.user_id, req.to_user, &req.message, req.source)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(sent)))
}

/// POST /friend-requests/{id}/handle
pub async fn handle_request(
    State(state): State<AppState>,
    Path(request_id): Path<RequestId>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<HandleRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    let request =
        blocking(move || engine.handle_request(caller.user_id, request_id, req.action)).await?;

    Ok(Json(request))
}

/// GET /friend-requests?direction=sent|received
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let queries = state.queries.clone();
    let views = blocking(move || queries.requests(caller.user_id, query.direction)).await?;

    Ok(Json(views))
}
