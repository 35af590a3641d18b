//! services/api/src/web/rest.rs
//!
//! Contains the response envelope shared by every REST handler and the master
//! definition for the OpenAPI specification.

use axum::{extract::FromRequest, http::StatusCode, response::Json};
use serde::Serialize;
use studentflow_core::dashboard::{DashboardSummary, ScreenPoint, StudyPoint, WellbeingPoint};
use studentflow_core::domain::{
    AiInsight, Category, DailyLog, Exam, Mood, NewTask, Priority, ProfileUpdate, ScheduleItem,
    Task, TaskStatus, TaskUpdate, Theme, User, UserId,
};
use studentflow_core::wellbeing::HabitInput;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use crate::error::ApiError;
use crate::web::{dashboard, insights, profile, routines, settings, tasks};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        profile::register_handler,
        profile::me_handler,
        profile::update_profile_handler,
        tasks::list_tasks_handler,
        tasks::create_task_handler,
        tasks::update_task_handler,
        tasks::complete_task_handler,
        tasks::uncomplete_task_handler,
        tasks::delete_task_handler,
        routines::add_daily_log_handler,
        routines::latest_logs_handler,
        dashboard::get_dashboard_handler,
        insights::get_insights_handler,
        insights::generate_insights_handler,
        insights::quick_advice_handler,
        settings::toggle_dark_mode_handler,
        settings::change_theme_handler,
    ),
    components(
        schemas(
            UserId, User, Exam, ProfileUpdate, Theme,
            Task, NewTask, TaskUpdate, Priority, Category, TaskStatus,
            DailyLog, HabitInput, Mood,
            DashboardSummary, StudyPoint, ScreenPoint, WellbeingPoint,
            AiInsight, ScheduleItem,
            profile::RegisterRequest,
            insights::AdviceRequest,
            settings::ThemeRequest, settings::DarkModeResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "StudentFlow API", description = "Tasks, daily routine logs, dashboard statistics and AI coaching for students.")
    )
)]
pub struct ApiDoc;

/// Registers the bearer scheme every protected route refers to.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

//=========================================================================================
// Response Envelope
//=========================================================================================

/// The envelope every JSON response is wrapped in. `success` mirrors the status code.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            success: status.as_u16() < 400,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// `Json` extraction whose rejections render through `ApiError`, so a body that
/// fails to decode still gets the envelope and a 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// What a successful handler returns: a status and an enveloped payload.
pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

pub fn reply<T>(status: StatusCode, data: T, message: &str) -> Reply<T> {
    (status, Json(ApiResponse::new(status, data, message)))
}

//=========================================================================================
// Health
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/v1",
    responses((status = 200, description = "The API is running", body = String))
)]
pub async fn health_handler() -> &'static str {
    "API is running"
}
