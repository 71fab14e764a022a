use std::sync::Arc;

use massval_core::verification::JobStore;
use massval_pipeline::Verifier;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Job statuses, written by verification tasks and read by pollers.
    pub jobs: Arc<dyn JobStore>,
    /// Starts background verification for accepted submissions.
    pub verifier: Verifier,
}
