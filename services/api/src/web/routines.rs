//! services/api/src/web/routines.rs
//!
//! Daily routine logging. Submitting a log for a day that already has one
//! replaces it entirely.

use axum::{extract::State, http::StatusCode, Extension};
use chrono::Utc;
use std::sync::Arc;
use studentflow_core::domain::{DailyLog, UserId};
use studentflow_core::wellbeing::{score_daily_log, HabitInput};
use tracing::info;

use crate::error::ApiError;
use crate::web::rest::{reply, ApiJson, Reply};
use crate::web::state::AppState;

/// How many logs `GET /routines/latest` returns.
const LATEST_LOGS: usize = 10;

/// Save the day's habits and return the stored log with its wellbeing score.
#[utoipa::path(
    post,
    path = "/api/v1/routines",
    tag = "routines",
    request_body = HabitInput,
    responses(
        (status = 200, description = "Daily routine saved", body = DailyLog),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn add_daily_log_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
    ApiJson(input): ApiJson<HabitInput>,
) -> Result<Reply<DailyLog>, ApiError> {
    let log = score_daily_log(uid, Utc::now().date_naive(), input);
    let saved = state.db.upsert_daily_log(log).await?;
    info!(
        "Saved log for {} on {} (wellbeing {})",
        saved.uid, saved.log_date, saved.wellbeing_score
    );
    Ok(reply(StatusCode::OK, saved, "Daily routine saved"))
}

/// The most recent logs, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/routines/latest",
    tag = "routines",
    responses(
        (status = 200, description = "Latest logs fetched", body = [DailyLog]),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn latest_logs_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
) -> Result<Reply<Vec<DailyLog>>, ApiError> {
    let logs = state.db.recent_daily_logs(&uid, LATEST_LOGS).await?;
    Ok(reply(StatusCode::OK, logs, "Latest logs fetched"))
}
