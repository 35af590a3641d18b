//! services/api/src/web/profile.rs
//!
//! Account endpoints. Credentials live with the identity provider; these routes
//! only manage the profile row keyed by the verified uid.

use axum::{extract::State, http::StatusCode, Extension};
use serde::Deserialize;
use std::sync::Arc;
use studentflow_core::domain::{ProfileUpdate, User, UserId};
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::rest::{reply, ApiJson, Reply};
use crate::web::state::AppState;

/// Optional details captured on the sign-up form.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Finish registration for a freshly signed-up identity.
///
/// The auth middleware has already created the profile row, so this only
/// records the name and email when they were sent.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "profile",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = User),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Reply<User>, ApiError> {
    let update = ProfileUpdate {
        full_name: request.name.filter(|name| !name.trim().is_empty()),
        email: request.email.filter(|email| !email.trim().is_empty()),
        ..ProfileUpdate::default()
    };
    let user = if update.is_empty() {
        state.db.get_or_create_user(&uid).await?
    } else {
        state.db.update_user(&uid, update).await?
    };
    info!("Registered user {}", uid);
    Ok(reply(StatusCode::CREATED, user, "User registered successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "profile",
    responses(
        (status = 200, description = "User fetched successfully", body = User),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
) -> Result<Reply<User>, ApiError> {
    let user = state.db.get_user(&uid).await?;
    Ok(reply(StatusCode::OK, user, "User fetched successfully"))
}

/// Update any subset of the profile fields.
#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    tag = "profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated successfully", body = User),
        (status = 400, description = "No fields to update"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Reply<User>, ApiError> {
    if update.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }
    let user = state.db.update_user(&uid, update).await?;
    Ok(reply(StatusCode::OK, user, "Profile updated successfully"))
}
