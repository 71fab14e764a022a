/// Fatal failures that abort a submission before any row is validated.
///
/// Row-level problems are never reported through this type; they are
/// accumulated as [`RowError`](crate::row_error::RowError) values instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error(transparent)]
    BatchSize(#[from] BatchSizeFailure),
}

/// The submitted workbook does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("Expected {expected} tab(s), found {found}")]
    WrongTabCount { expected: usize, found: usize },

    #[error("Tab {position} must be named '{expected}', found '{found}'")]
    WrongTabName {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("Header of tab '{tab}' does not match the expected columns")]
    InvalidHeader { tab: String },
}

/// The establishment tab has too few or too many data rows.
///
/// The two variants are mutually exclusive: the lower bound is checked first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchSizeFailure {
    #[error("At least {min} establishment rows are required, found {count}")]
    TooFewRows { count: usize, min: usize },

    #[error("At most {max} establishment rows are accepted, found {count}")]
    TooManyRows { count: usize, max: usize },
}

impl BatchSizeFailure {
    pub fn has_enough_rows(&self) -> bool {
        !matches!(self, Self::TooFewRows { .. })
    }

    pub fn has_too_many_rows(&self) -> bool {
        matches!(self, Self::TooManyRows { .. })
    }
}

/// Why a registry lookup did not produce a definite answer.
///
/// Every variant is treated as "establishment not confirmed" by the
/// verification step; there is no retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Registry transport failure: {0}")]
    Transport(String),

    #[error("Registry lookup timed out")]
    Timeout,

    #[error("Registry returned HTTP {status}")]
    Status { status: u16 },

    #[error("Malformed registry response: {0}")]
    Malformed(String),
}
