//! Ordered row containers and batch-level validation.
//!
//! `*Rows` types hold freshly read rows. Validating one consumes it and
//! returns a batch of [`Checked`] rows, so batch validity is only observable
//! once the relevant passes have run.

use std::collections::{BTreeSet, HashSet};

use crate::error::BatchSizeFailure;
use crate::fields::{self, ImportKind};
use crate::row_error::RowError;
use crate::rows::{
    delimited_header, Checked, EstablishmentRow, FieldChecked, ReferentialChecked, RoleRow,
    UpdateRecord,
};
use crate::tabular::{read_record, RawCell, Sheet};
use crate::verification::SiretCheck;

// ---------------------------------------------------------------------------
// Admin sirets
// ---------------------------------------------------------------------------

/// Sirets covered by at least one ADMIN role row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSirets(BTreeSet<String>);

impl AdminSirets {
    pub fn contains(&self, siret: &str) -> bool {
        self.0.contains(siret)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for AdminSirets {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Establishments
// ---------------------------------------------------------------------------

/// Establishment rows as read, before any validation.
#[derive(Debug, Clone, PartialEq)]
pub struct EstablishmentRows {
    kind: ImportKind,
    header: Option<Vec<RawCell>>,
    rows: Vec<EstablishmentRow>,
    seen: usize,
}

impl EstablishmentRows {
    pub fn new(kind: ImportKind) -> Self {
        Self {
            kind,
            header: None,
            rows: Vec::new(),
            seen: 0,
        }
    }

    pub fn from_sheet(kind: ImportKind, sheet: &Sheet) -> Self {
        let mut rows = Self::new(kind);
        for raw in &sheet.rows {
            rows.append(raw.clone());
        }
        rows
    }

    /// The first appended row becomes the header. Later rows are numbered
    /// from 1 by their position after the header; blank rows are dropped but
    /// still consume a number.
    pub fn append(&mut self, raw: Vec<RawCell>) {
        if self.header.is_none() {
            self.header = Some(raw);
            return;
        }
        self.seen += 1;
        let record = read_record(&raw, self.kind.establishment_fields());
        if let Some(row) = EstablishmentRow::from_record(self.kind, self.seen, &record) {
            self.rows.push(row);
        }
    }

    pub fn kind(&self) -> ImportKind {
        self.kind
    }

    pub fn header(&self) -> Option<&[RawCell]> {
        self.header.as_deref()
    }

    pub fn rows(&self) -> &[EstablishmentRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct non-empty sirets, available before validation so the role
    /// tab can be checked against them.
    pub fn sirets(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .map(|r| r.siret())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Batch size first (too few, then too many), then every row's field
    /// rules. A size failure means no row was validated.
    pub fn validate(self) -> Result<EstablishmentBatch<FieldChecked>, BatchSizeFailure> {
        let count = self.rows.len();
        let min = self.kind.min_rows();
        let max = self.kind.max_rows();
        if count < min {
            return Err(BatchSizeFailure::TooFewRows { count, min });
        }
        if count > max {
            return Err(BatchSizeFailure::TooManyRows { count, max });
        }
        Ok(EstablishmentBatch {
            kind: self.kind,
            rows: self.rows.into_iter().map(EstablishmentRow::validate).collect(),
        })
    }
}

/// Validated establishment rows at stage `S`.
#[derive(Debug, Clone, PartialEq)]
pub struct EstablishmentBatch<S> {
    kind: ImportKind,
    rows: Vec<Checked<EstablishmentRow, S>>,
}

impl<S> EstablishmentBatch<S> {
    pub fn kind(&self) -> ImportKind {
        self.kind
    }

    pub fn rows(&self) -> &[Checked<EstablishmentRow, S>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.rows.iter().all(Checked::is_valid)
    }

    /// All errors, in row order.
    pub fn errors(&self) -> impl Iterator<Item = &RowError> {
        self.rows.iter().flat_map(|r| r.errors())
    }

    /// One `(siret, row)` pair per row, in row order, for registry checks.
    pub fn verification_entries(&self) -> Vec<SiretCheck> {
        self.rows
            .iter()
            .map(|r| SiretCheck::new(r.row().siret(), r.row().index()))
            .collect()
    }

    /// Header line followed by one line per row.
    pub fn as_delimited(&self) -> Vec<String> {
        std::iter::once(delimited_header(self.kind.establishment_fields()))
            .chain(self.rows.iter().map(|r| r.row().as_delimited_row()))
            .collect()
    }

    /// Structured update records; empty for create batches.
    pub fn structured_export(&self) -> Vec<UpdateRecord> {
        self.rows
            .iter()
            .filter_map(|r| r.row().structured_export())
            .collect()
    }
}

impl EstablishmentBatch<FieldChecked> {
    /// Flag every establishment whose siret has no ADMIN role.
    ///
    /// Only defined on a batch whose field pass succeeded; an invalid batch
    /// is handed back unchanged.
    pub fn validate_have_admin(
        self,
        admins: &AdminSirets,
    ) -> Result<EstablishmentBatch<ReferentialChecked>, Self> {
        if !self.is_valid() {
            return Err(self);
        }
        Ok(EstablishmentBatch {
            kind: self.kind,
            rows: self
                .rows
                .into_iter()
                .map(|r| r.validate_has_admin(admins))
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Role rows as read, before any validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleRows {
    header: Option<Vec<RawCell>>,
    rows: Vec<RoleRow>,
    seen: usize,
}

impl RoleRows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sheet(sheet: &Sheet) -> Self {
        let mut rows = Self::new();
        for raw in &sheet.rows {
            rows.append(raw.clone());
        }
        rows
    }

    /// Same header and numbering rules as [`EstablishmentRows::append`].
    pub fn append(&mut self, raw: Vec<RawCell>) {
        if self.header.is_none() {
            self.header = Some(raw);
            return;
        }
        self.seen += 1;
        let record = read_record(&raw, fields::ROLES_FIELDS);
        if let Some(row) = RoleRow::from_record(self.seen, &record) {
            self.rows.push(row);
        }
    }

    pub fn header(&self) -> Option<&[RawCell]> {
        self.header.as_deref()
    }

    pub fn rows(&self) -> &[RoleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Validate every row against `establishment_sirets`, then flag repeated
    /// `(siret, email)` pairs. The first occurrence of a pair is never
    /// flagged; every later one is.
    pub fn validate(self, establishment_sirets: &BTreeSet<String>) -> RoleBatch {
        let checked: Vec<_> = self
            .rows
            .into_iter()
            .map(|r| r.validate(establishment_sirets))
            .collect();

        let duplicates = duplicate_flags(checked.iter().map(|c| c.row().pair_key()));

        RoleBatch {
            rows: checked
                .into_iter()
                .zip(duplicates)
                .map(|(row, dup)| row.mark_duplicate(dup))
                .collect(),
        }
    }
}

/// `true` at every position whose key already appeared earlier.
fn duplicate_flags<'a>(keys: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<bool> {
    let mut seen = HashSet::new();
    keys.map(|key| !seen.insert(key)).collect()
}

/// Fully validated role rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleBatch {
    rows: Vec<Checked<RoleRow, ReferentialChecked>>,
}

impl RoleBatch {
    pub fn rows(&self) -> &[Checked<RoleRow, ReferentialChecked>] {
        &self.rows
    }

    pub fn is_valid(&self) -> bool {
        self.rows.iter().all(Checked::is_valid)
    }

    pub fn errors(&self) -> impl Iterator<Item = &RowError> {
        self.rows.iter().flat_map(|r| r.errors())
    }

    pub fn has_duplicates(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| r.errors())
            .any(|e| e.kind == crate::row_error::ErrorKind::DuplicateRole)
    }

    /// Sirets carrying an ADMIN row. `None` when the batch is invalid, since
    /// admin coverage is undefined for a role tab that failed validation.
    pub fn admin_sirets(&self) -> Option<AdminSirets> {
        if !self.is_valid() {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(Checked::row)
                .filter(|r| !r.siret.is_empty() && r.is_admin())
                .map(|r| r.siret.clone())
                .collect(),
        )
    }

    pub fn as_delimited(&self) -> Vec<String> {
        std::iter::once(delimited_header(fields::ROLES_FIELDS))
            .chain(self.rows.iter().map(|r| r.row().as_delimited_row()))
            .collect()
    }
}
