//! Route definitions for the `/imports` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::imports;
use crate::state::AppState;

/// Routes mounted at `/imports`.
///
/// ```text
/// POST   /create          -> import_create
/// POST   /update          -> import_update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(imports::import_create))
        .route("/update", post(imports::import_update))
}
