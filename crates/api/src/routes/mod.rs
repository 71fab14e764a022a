pub mod health;
pub mod imports;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /imports/create          validate a create workbook (POST)
/// /imports/update          validate an update workbook (POST)
/// /jobs/{id}               poll a verification job (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/imports", imports::router())
        .nest("/jobs", jobs::router())
}
