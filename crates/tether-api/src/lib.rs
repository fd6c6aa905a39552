pub mod blocks;
pub mod error;
pub mod friends;
pub mod middleware;
pub mod requests;
pub mod state;

use axum::{
    Extension, Router,
    extract::{State, WebSocketUpgrade},
    middleware::from_fn,
    response::IntoResponse,
    routing::{get, post, put},
};

use tether_gateway::connection;

use crate::middleware::{Caller, require_caller};
use crate::state::AppState;

/// All relationship routes plus the device gateway. Everything except
/// `/health` requires the caller header.
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/friend-requests",
            post(requests::send_request).get(requests::list_requests),
        )
        .route("/friend-requests/{id}/handle", post(requests::handle_request))
        .route("/friends", get(friends::list_friends))
        .route("/friends/check", post(friends::batch_is_friend))
        .route(
            "/friends/{peer}",
            get(friends::is_friend).delete(friends::remove_friend),
        )
        .route("/friends/{peer}/remark", put(friends::update_remark))
        .route("/blocks", get(blocks::list_blocks).post(blocks::block))
        .route(
            "/blocks/{user}",
            get(blocks::is_blocked).delete(blocks::unblock),
        )
        .route("/gateway", get(ws_upgrade))
        .layer(from_fn(require_caller))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .merge(protected_routes)
}

async fn ws_upgrade(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let dispatcher = state.dispatcher.clone();
    ws.on_upgrade(move |socket| connection::handle_session(socket, dispatcher, caller.user_id))
}

async fn health() -> &'static str {
    "ok"
}
