//! Stateless per-field predicates.
//!
//! Each function answers "is this value acceptable" and nothing more; the
//! row models decide which predicates apply and how failures are recorded.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

use crate::taxonomy::{self, SubtypeFamily};

/// French national number: `0X XX XX XX XX`, groups optionally separated by
/// a space, underscore, dot or hyphen.
const PHONE_PATTERN: &str = r"^(0[1-9])(?:[ _.-]?(\d{2})){4}$";

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

/// Length check only; no checksum is computed.
pub const SIRET_LENGTH: usize = 14;

pub fn siret_is_valid(siret: &str) -> bool {
    siret.chars().count() == SIRET_LENGTH
}

/// At least one company type, all of them known.
pub fn company_types_are_valid(company_types: &[String]) -> bool {
    !company_types.is_empty()
        && company_types
            .iter()
            .all(|c| taxonomy::is_company_type(c))
}

/// Subtypes are optional; when present, `required_parent` must be among the
/// row's company types and every subtype must belong to `allowed`.
pub fn dependent_subtypes_are_valid(
    subtypes: &[String],
    company_types: &[String],
    required_parent: &str,
    allowed: &[&str],
) -> bool {
    if subtypes.is_empty() {
        return true;
    }
    if !company_types.iter().any(|c| c == required_parent) {
        return false;
    }
    subtypes.iter().all(|s| allowed.contains(&s.as_str()))
}

pub fn subtypes_are_valid(
    family: SubtypeFamily,
    subtypes: &[String],
    company_types: &[String],
) -> bool {
    dependent_subtypes_are_valid(subtypes, company_types, family.parent(), family.allowed())
}

/// Empty is accepted (the contact phone is optional).
pub fn phone_is_valid(phone: &str) -> bool {
    phone.is_empty() || PHONE_RE.is_match(phone)
}

/// Contact email: optional, but well formed when present.
pub fn optional_email_is_valid(email: &str) -> bool {
    email.is_empty() || email_is_well_formed(email)
}

/// Role email: mandatory and well formed.
pub fn required_email_is_valid(email: &str) -> bool {
    !email.is_empty() && email_is_well_formed(email)
}

pub fn role_is_valid(role: &str) -> bool {
    taxonomy::is_user_role(role)
}

/// Shape check plus a qualified domain: dotted, `localhost`, or a bracketed
/// IP literal.
fn email_is_well_formed(email: &str) -> bool {
    if !email.to_owned().validate_email() {
        return false;
    }
    match email.rsplit_once('@') {
        Some((_, domain)) => {
            domain.contains('.')
                || domain.eq_ignore_ascii_case("localhost")
                || (domain.starts_with('[') && domain.ends_with(']'))
        }
        None => false,
    }
}
