//! services/api/src/web/insights.rs
//!
//! AI coaching endpoints. Generation can take a while; nothing shared is held
//! while the provider is working.

use axum::{extract::State, http::StatusCode, Extension};
use serde::Deserialize;
use std::sync::Arc;
use studentflow_core::domain::{AiInsight, UserId};
use studentflow_core::insights;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::rest::{reply, ApiJson, Reply};
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct AdviceRequest {
    pub query: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// The stored insight history, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/insights",
    tag = "insights",
    responses(
        (status = 200, description = "Insights fetched", body = [AiInsight]),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn get_insights_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
) -> Result<Reply<Vec<AiInsight>>, ApiError> {
    let history = insights::insight_history(state.db.as_ref(), &uid).await?;
    Ok(reply(StatusCode::OK, history, "Insights fetched"))
}

/// Generate a new insight from the caller's profile, tasks and last week of logs.
#[utoipa::path(
    post,
    path = "/api/v1/insights/generate",
    tag = "insights",
    responses(
        (status = 200, description = "New insight generated", body = AiInsight),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 503, description = "The AI provider failed, timed out or returned malformed output")
    ),
    security(("bearer" = []))
)]
pub async fn generate_insights_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
) -> Result<Reply<AiInsight>, ApiError> {
    let insight = insights::generate_insight(
        state.db.as_ref(),
        state.insights_adapter.as_ref(),
        &uid,
    )
    .await?;
    Ok(reply(StatusCode::OK, insight, "New insight generated"))
}

/// Two-sentence advice for a free-text question. Not stored.
#[utoipa::path(
    post,
    path = "/api/v1/insights/chat",
    tag = "insights",
    request_body = AdviceRequest,
    responses(
        (status = 200, description = "Response generated", body = String),
        (status = 400, description = "Empty query"),
        (status = 503, description = "The AI provider is unavailable")
    ),
    security(("bearer" = []))
)]
pub async fn quick_advice_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<AdviceRequest>,
) -> Result<Reply<String>, ApiError> {
    let answer = insights::quick_advice(
        state.insights_adapter.as_ref(),
        &request.query,
        request.context.as_deref().unwrap_or_default(),
    )
    .await?;
    Ok(reply(StatusCode::OK, answer, "Response generated"))
}
