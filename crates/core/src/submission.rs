//! End-to-end validation of one submitted workbook.
//!
//! Order of operations:
//!
//! 1. workbook shape (tab count and names), then every header;
//! 2. establishment batch size, then establishment field rules;
//! 3. role field rules and duplicate detection (create only);
//! 4. admin coverage, only when both tabs passed on their own;
//! 5. the registry verification list, only when no error was found.
//!
//! Steps 1 and 2 can fail fatally; everything after is accumulated.

use serde::Serialize;

use crate::collections::{EstablishmentRows, RoleRows};
use crate::error::ImportError;
use crate::fields::{self, ImportKind};
use crate::row_error::{RenderedError, RowError, Tab};
use crate::rows::UpdateRecord;
use crate::tabular::Workbook;
use crate::verification::SiretCheck;

/// Outcome of a submission that got past the fatal checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReport {
    pub kind: ImportKind,
    /// Every row error, establishments first, each tab in row order.
    pub errors: Vec<RowError>,
    pub establishments_delimited: Vec<String>,
    /// Empty for update submissions.
    pub roles_delimited: Vec<String>,
    /// Structured update records; empty unless an update submission is valid.
    pub export: Vec<UpdateRecord>,
    /// Rows to confirm against the registry; empty unless valid.
    pub to_verify: Vec<SiretCheck>,
}

impl SubmissionReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn rendered_errors(&self) -> Vec<RenderedError> {
        self.errors.iter().map(RowError::render).collect()
    }
}

/// Dispatch on the submission kind.
pub fn validate(kind: ImportKind, workbook: &Workbook) -> Result<SubmissionReport, ImportError> {
    match kind {
        ImportKind::Create => validate_create(workbook),
        ImportKind::Update => validate_update(workbook),
    }
}

pub fn validate_create(workbook: &Workbook) -> Result<SubmissionReport, ImportError> {
    let kind = ImportKind::Create;
    workbook.expect_tabs(kind.tab_names())?;
    let (establishment_sheet, role_sheet) = (&workbook.sheets[0], &workbook.sheets[1]);
    establishment_sheet.validate_header(kind.establishment_fields())?;
    role_sheet.validate_header(fields::ROLES_FIELDS)?;

    let establishments = EstablishmentRows::from_sheet(kind, establishment_sheet);
    let establishment_sirets = establishments.sirets();
    let establishments = establishments.validate()?;

    let roles = RoleRows::from_sheet(role_sheet).validate(&establishment_sirets);

    let establishments_delimited = establishments.as_delimited();
    let roles_delimited = roles.as_delimited();
    let entries = establishments.verification_entries();

    let mut errors: Vec<RowError> = establishments
        .errors()
        .chain(roles.errors())
        .cloned()
        .collect();

    if let Some(admins) = roles.admin_sirets() {
        if let Ok(checked) = establishments.validate_have_admin(&admins) {
            errors.extend(checked.rows().iter().flat_map(|r| r.increment()).cloned());
        }
    }
    sort_errors(&mut errors);

    let to_verify = if errors.is_empty() { entries } else { Vec::new() };

    Ok(SubmissionReport {
        kind,
        errors,
        establishments_delimited,
        roles_delimited,
        export: Vec::new(),
        to_verify,
    })
}

pub fn validate_update(workbook: &Workbook) -> Result<SubmissionReport, ImportError> {
    let kind = ImportKind::Update;
    workbook.expect_tabs(kind.tab_names())?;
    let sheet = &workbook.sheets[0];
    sheet.validate_header(kind.establishment_fields())?;

    let establishments = EstablishmentRows::from_sheet(kind, sheet).validate()?;
    let errors: Vec<RowError> = establishments.errors().cloned().collect();
    let valid = errors.is_empty();

    Ok(SubmissionReport {
        kind,
        establishments_delimited: establishments.as_delimited(),
        roles_delimited: Vec::new(),
        export: if valid {
            establishments.structured_export()
        } else {
            Vec::new()
        },
        to_verify: if valid {
            establishments.verification_entries()
        } else {
            Vec::new()
        },
        errors,
    })
}

/// Establishments before roles, then by row. Stable, so field order within a
/// row is kept.
fn sort_errors(errors: &mut [RowError]) {
    errors.sort_by_key(|e| (e.tab == Tab::Roles, e.row_number));
}
