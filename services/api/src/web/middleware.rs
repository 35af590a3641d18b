//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use studentflow_core::ports::PortError;
use tracing::debug;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Pulls the credential out of an `Authorization: Bearer <token>` header.
fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Middleware that resolves the bearer token to a uid through the identity port.
///
/// On success the user row is created if this is their first request, and the
/// `UserId` is inserted into request extensions for handlers to use.
/// A missing or rejected token yields 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract the bearer token
    let token = bearer_token(&req).ok_or(PortError::Unauthorized)?;

    // 2. Ask the identity provider who it belongs to
    let uid = state.identity_adapter.verify_token(&token).await?;

    // 3. Make sure the user record exists
    state.db.get_or_create_user(&uid).await?;
    debug!("Authenticated request for {}", uid);

    // 4. Insert the uid into request extensions
    req.extensions_mut().insert(uid);

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
