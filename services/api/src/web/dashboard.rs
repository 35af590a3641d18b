//! services/api/src/web/dashboard.rs

use axum::{extract::State, http::StatusCode, Extension};
use std::sync::Arc;
use studentflow_core::dashboard::{build_dashboard, DashboardSummary};
use studentflow_core::domain::UserId;

use crate::error::ApiError;
use crate::web::rest::{reply, Reply};
use crate::web::state::AppState;

/// Weekly statistics for the dashboard charts.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "Got Dashboard Stats successfully", body = DashboardSummary),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn get_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
) -> Result<Reply<DashboardSummary>, ApiError> {
    let summary = build_dashboard(state.db.as_ref(), &uid).await?;
    Ok(reply(StatusCode::OK, summary, "Got Dashboard Stats successfully"))
}
