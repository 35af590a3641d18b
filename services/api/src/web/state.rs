//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;
use studentflow_core::ports::{DatabaseService, IdentityService, InsightGenerationService};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
/// Every collaborator is injected, so tests can swap in in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub insights_adapter: Arc<dyn InsightGenerationService>,
    pub identity_adapter: Arc<dyn IdentityService>,
}
