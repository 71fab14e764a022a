//! Row models and their staged validation.
//!
//! A freshly read row carries no validity at all. Validating it consumes the
//! row and yields a [`Checked`] snapshot at the [`FieldChecked`] stage;
//! referential checks then advance it to [`ReferentialChecked`]. Asking
//! whether an unvalidated row is valid therefore does not compile.

pub mod establishment;
pub mod role;

use std::marker::PhantomData;

use crate::row_error::RowError;

pub use establishment::{Contact, Establishment, EstablishmentRow, UpdateRecord};
pub use role::{Role, RoleRow};

/// Status label for a row without errors.
pub const VALID_STR: &str = "Valide";
/// Status label for a row with at least one error.
pub const ERROR_STR: &str = "Erreur";

/// Cell separator for delimited exports; list cells use commas internally.
pub const DELIMITER: &str = ";";

/// Wrap a cell in double quotes, doubling any embedded quote.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Join already-quoted cells into one delimited line.
pub fn format_delimited_row<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .map(|c| c.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// Quoted header line for a column layout.
pub fn delimited_header(fields: &[&str]) -> String {
    format_delimited_row(fields.iter().map(|f| quote(f)))
}

/// Stage marker: the row's own field rules have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChecked;

/// Stage marker: cross-tab rules have run on top of the field rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferentialChecked;

/// An immutable validation snapshot of a row at stage `S`.
///
/// `errors` is cumulative across stages; [`increment`](Self::increment)
/// returns only what the most recent transition added.
#[derive(Debug, Clone, PartialEq)]
pub struct Checked<R, S> {
    row: R,
    errors: Vec<RowError>,
    increment_from: usize,
    stage: PhantomData<S>,
}

impl<R> Checked<R, FieldChecked> {
    pub(crate) fn first(row: R, errors: Vec<RowError>) -> Self {
        Self {
            row,
            errors,
            increment_from: 0,
            stage: PhantomData,
        }
    }
}

impl<R, S> Checked<R, S> {
    pub fn row(&self) -> &R {
        &self.row
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    /// Errors added by the transition that produced this snapshot.
    pub fn increment(&self) -> &[RowError] {
        &self.errors[self.increment_from..]
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_valid() {
            VALID_STR
        } else {
            ERROR_STR
        }
    }

    /// Move to stage `T`, appending `extra` without touching earlier errors.
    pub(crate) fn advance<T>(self, extra: impl IntoIterator<Item = RowError>) -> Checked<R, T> {
        let increment_from = self.errors.len();
        let mut errors = self.errors;
        errors.extend(extra);
        Checked {
            row: self.row,
            errors,
            increment_from,
            stage: PhantomData,
        }
    }
}
