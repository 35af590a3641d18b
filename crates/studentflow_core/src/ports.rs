//! crates/studentflow_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core logic depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! scorer, aggregator and insight orchestrator independent of the database,
//! the generative-AI provider and the identity provider.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    AiInsight, DailyLog, NewTask, ProfileUpdate, Task, TaskUpdate, Theme, User, UserId,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The record does not exist for the caller. Never distinguishes between
    /// "absent" and "owned by someone else".
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// An external dependency failed, timed out, or answered with garbage.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage for users, tasks and daily logs.
///
/// Every task and log operation is scoped by `uid`; an id that belongs to
/// another user behaves exactly like an id that does not exist.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    async fn get_or_create_user(&self, uid: &UserId) -> PortResult<User>;

    async fn get_user(&self, uid: &UserId) -> PortResult<User>;

    async fn update_user(&self, uid: &UserId, update: ProfileUpdate) -> PortResult<User>;

    async fn set_dark_mode(&self, uid: &UserId, enabled: bool) -> PortResult<()>;

    async fn set_color_theme(&self, uid: &UserId, theme: Theme) -> PortResult<()>;

    // --- Insight history (stored on the user record) ---
    async fn get_insight_history(&self, uid: &UserId) -> PortResult<Vec<AiInsight>>;

    /// Replaces the whole history in a single write.
    async fn replace_insight_history(&self, uid: &UserId, history: &[AiInsight])
        -> PortResult<()>;

    // --- Tasks ---
    /// All of the user's tasks, earliest deadline first, undated tasks last.
    async fn list_tasks(&self, uid: &UserId) -> PortResult<Vec<Task>>;

    async fn create_task(&self, uid: &UserId, task: NewTask) -> PortResult<Task>;

    async fn update_task(&self, uid: &UserId, task_id: Uuid, update: TaskUpdate)
        -> PortResult<Task>;

    async fn delete_task(&self, uid: &UserId, task_id: Uuid) -> PortResult<()>;

    // --- Daily logs ---
    /// Inserts the log, or overwrites every field of the existing log for the
    /// same (uid, log_date).
    async fn upsert_daily_log(&self, log: DailyLog) -> PortResult<DailyLog>;

    /// The most recent `limit` logs, newest first.
    async fn recent_daily_logs(&self, uid: &UserId, limit: usize) -> PortResult<Vec<DailyLog>>;
}

#[async_trait]
pub trait InsightGenerationService: Send + Sync {
    /// Generates a JSON document for `prompt`, constrained to `schema`.
    /// Returns the raw JSON text; decoding and validation belong to the caller.
    async fn generate_structured(&self, prompt: &str, schema: &Value) -> PortResult<String>;

    /// Answers a free-text question in a couple of sentences.
    async fn quick_advice(&self, query: &str, context: &str) -> PortResult<String>;
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolves an opaque bearer credential to the user it was issued for.
    async fn verify_token(&self, token: &str) -> PortResult<UserId>;
}
