//! services/api/src/web/settings.rs

use axum::{extract::State, http::StatusCode, Extension};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studentflow_core::domain::{Theme, UserId};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::rest::{reply, ApiJson, Reply};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ThemeRequest {
    #[serde(default)]
    pub theme: Option<String>,
}

/// Same field casing as `User::dark_mode`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DarkModeResponse {
    pub dark_mode: bool,
}

/// Flip the dark mode flag and return its new value.
#[utoipa::path(
    patch,
    path = "/api/v1/settings/dark-mode",
    tag = "settings",
    responses(
        (status = 200, description = "Dark mode toggled", body = DarkModeResponse),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn toggle_dark_mode_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
) -> Result<Reply<DarkModeResponse>, ApiError> {
    let user = state.db.get_user(&uid).await?;
    let dark_mode = !user.dark_mode;
    state.db.set_dark_mode(&uid, dark_mode).await?;
    Ok(reply(
        StatusCode::OK,
        DarkModeResponse { dark_mode },
        "Dark mode toggled",
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/settings/theme",
    tag = "settings",
    request_body = ThemeRequest,
    responses(
        (status = 200, description = "Theme updated", body = Theme),
        (status = 400, description = "Missing or unknown theme")
    ),
    security(("bearer" = []))
)]
pub async fn change_theme_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
    ApiJson(request): ApiJson<ThemeRequest>,
) -> Result<Reply<Theme>, ApiError> {
    let theme = request
        .theme
        .as_deref()
        .and_then(|label| label.parse::<Theme>().ok())
        .ok_or_else(|| {
            let allowed: Vec<&str> = Theme::ALL.iter().map(Theme::as_str).collect();
            ApiError::validation(format!("Invalid theme. Allowed: {}", allowed.join(", ")))
        })?;
    state.db.set_color_theme(&uid, theme).await?;
    Ok(reply(StatusCode::OK, theme, "Theme updated"))
}
