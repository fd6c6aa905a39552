use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use uuid::Uuid;

use tether_types::models::UserId;

/// Header carrying the caller's user id, set by the upstream auth gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: UserId,
}

/// Extract the caller identity from the trusted header.
pub async fn require_caller(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<Uuid>().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(Caller { user_id });
    Ok(next.run(req).await)
}
