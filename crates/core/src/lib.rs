//! Bulk establishment import validation.
//!
//! Pure domain logic for validating a two-tab establishment/role submission:
//! taxonomy, field validators, staged row validation, batch invariants,
//! cross-tab referential checks, error rendering and the types shared with
//! the asynchronous registry verification step. No I/O lives here.

pub mod collections;
pub mod error;
pub mod fields;
pub mod row_error;
pub mod rows;
pub mod submission;
pub mod tabular;
pub mod taxonomy;
pub mod validators;
pub mod verification;
