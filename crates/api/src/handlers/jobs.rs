//! Handlers for the `/jobs` resource.

use axum::extract::{Path, State};
use axum::Json;

use massval_core::verification::JobPoll;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/jobs/{id}
///
/// Progress while running; progress 100 and the failure list once done.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<JobPoll>>> {
    let status = state
        .jobs
        .get(&id)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    Ok(Json(DataResponse {
        data: status.poll(),
    }))
}
