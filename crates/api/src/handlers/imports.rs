//! Handlers for the `/imports` resource.
//!
//! A submission is validated synchronously. Fatal problems (workbook shape,
//! batch size) are errors; row problems are returned as data. A fully valid
//! submission starts a background verification job whose id is returned
//! immediately.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use massval_core::fields::ImportKind;
use massval_core::row_error::RenderedError;
use massval_core::rows::UpdateRecord;
use massval_core::submission::{self, SubmissionReport};
use massval_core::tabular::Workbook;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of validating one workbook.
#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RenderedError>,
    /// Verification job started for a valid submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Structured records of a valid update submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<Vec<UpdateRecord>>,
    pub establishments_delimited: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles_delimited: Vec<String>,
}

impl ImportOutcome {
    fn rejected(report: SubmissionReport) -> Self {
        Self {
            valid: false,
            errors: report.rendered_errors(),
            job_id: None,
            export: None,
            establishments_delimited: report.establishments_delimited,
            roles_delimited: report.roles_delimited,
        }
    }

    fn accepted(report: SubmissionReport, job_id: String) -> Self {
        let export = (report.kind == ImportKind::Update).then_some(report.export);
        Self {
            valid: true,
            errors: Vec::new(),
            job_id: Some(job_id),
            export,
            establishments_delimited: report.establishments_delimited,
            roles_delimited: report.roles_delimited,
        }
    }
}

/// POST /api/v1/imports/create
pub async fn import_create(
    State(state): State<AppState>,
    body: Result<Json<Workbook>, JsonRejection>,
) -> AppResult<Json<DataResponse<ImportOutcome>>> {
    handle_submission(&state, ImportKind::Create, body).await
}

/// POST /api/v1/imports/update
pub async fn import_update(
    State(state): State<AppState>,
    body: Result<Json<Workbook>, JsonRejection>,
) -> AppResult<Json<DataResponse<ImportOutcome>>> {
    handle_submission(&state, ImportKind::Update, body).await
}

async fn handle_submission(
    state: &AppState,
    kind: ImportKind,
    body: Result<Json<Workbook>, JsonRejection>,
) -> AppResult<Json<DataResponse<ImportOutcome>>> {
    let Json(workbook) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let report = submission::validate(kind, &workbook).inspect_err(|e| {
        tracing::info!(kind = kind.as_str(), error = %e, "Submission refused");
    })?;

    if !report.is_valid() {
        tracing::info!(
            kind = kind.as_str(),
            errors = report.errors.len(),
            "Submission has row errors",
        );
        return Ok(Json(DataResponse {
            data: ImportOutcome::rejected(report),
        }));
    }

    let job_id = state
        .verifier
        .submit(report.to_verify.clone())
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    tracing::info!(
        kind = kind.as_str(),
        rows = report.to_verify.len(),
        job_id = %job_id,
        "Submission accepted, verification started",
    );

    Ok(Json(DataResponse {
        data: ImportOutcome::accepted(report, job_id),
    }))
}
