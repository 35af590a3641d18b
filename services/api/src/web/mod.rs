pub mod dashboard;
pub mod insights;
pub mod middleware;
pub mod profile;
pub mod rest;
pub mod routines;
pub mod settings;
pub mod state;
pub mod tasks;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_auth;
use state::AppState;

/// Builds the `/api/v1` router. Everything except the health probe sits behind
/// `require_auth`.
pub fn router(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/auth/register", post(profile::register_handler))
        .route("/auth/me", get(profile::me_handler))
        .route("/auth/profile", put(profile::update_profile_handler))
        .route(
            "/tasks",
            get(tasks::list_tasks_handler).post(tasks::create_task_handler),
        )
        .route(
            "/tasks/{id}",
            put(tasks::update_task_handler)
                .patch(tasks::update_task_handler)
                .delete(tasks::delete_task_handler),
        )
        .route("/tasks/{id}/complete", patch(tasks::complete_task_handler))
        .route("/tasks/{id}/uncomplete", patch(tasks::uncomplete_task_handler))
        .route("/routines", post(routines::add_daily_log_handler))
        .route("/routines/latest", get(routines::latest_logs_handler))
        .route("/dashboard", get(dashboard::get_dashboard_handler))
        .route("/insights", get(insights::get_insights_handler))
        .route("/insights/generate", post(insights::generate_insights_handler))
        .route("/insights/chat", post(insights::quick_advice_handler))
        .route("/settings/dark-mode", patch(settings::toggle_dark_mode_handler))
        .route("/settings/theme", patch(settings::change_theme_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .route("/", get(rest::health_handler))
        .merge(protected_routes);

    Router::new().nest("/api/v1", api_router).with_state(state)
}
