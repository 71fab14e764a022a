//! Role rows: which user email gets which role on which establishment.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{format_delimited_row, quote, Checked, FieldChecked, ReferentialChecked};
use crate::fields;
use crate::row_error::{ErrorKind, Field, RowError, Tab};
use crate::tabular::{self, RawRecord};
use crate::taxonomy::{ROLE_ADMIN, ROLE_MEMBER};
use crate::validators;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    /// Exact, case-sensitive match on `MEMBER` / `ADMIN`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            ROLE_MEMBER => Some(Self::Member),
            ROLE_ADMIN => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => ROLE_MEMBER,
            Self::Admin => ROLE_ADMIN,
        }
    }
}

/// One data row of the role tab. `role` keeps the raw cell so an invalid
/// value can be reported as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleRow {
    pub index: usize,
    pub siret: String,
    pub email: String,
    pub role: String,
}

impl RoleRow {
    pub fn from_record(index: usize, record: &RawRecord) -> Option<Self> {
        if tabular::record_is_blank(record) {
            return None;
        }
        Some(Self {
            index,
            siret: tabular::text(record, fields::SIRET),
            email: tabular::text(record, fields::EMAIL),
            role: tabular::text(record, fields::ROLE),
        })
    }

    pub fn parsed_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.parsed_role() == Some(Role::Admin)
    }

    /// Key used for duplicate detection.
    pub fn pair_key(&self) -> (&str, &str) {
        (&self.siret, &self.email)
    }

    fn error(&self, field: Field, value: &str) -> RowError {
        RowError::invalid_field(Tab::Roles, self.index, field, value)
    }

    /// Role format, siret format, siret presence among `establishment_sirets`
    /// and email, each checked regardless of the others.
    pub fn validate(self, establishment_sirets: &BTreeSet<String>) -> Checked<Self, FieldChecked> {
        let mut errors = Vec::new();
        if !validators::role_is_valid(&self.role) {
            errors.push(self.error(Field::Role, &self.role));
        }
        if !validators::siret_is_valid(&self.siret) {
            errors.push(self.error(Field::Siret, &self.siret));
        }
        if !establishment_sirets.contains(&self.siret) {
            errors.push(
                self.error(Field::Siret, &self.siret)
                    .with_kind(ErrorKind::SiretMissingFromEstablishments),
            );
        }
        if !validators::required_email_is_valid(&self.email) {
            errors.push(self.error(Field::Email, &self.email));
        }
        Checked::first(self, errors)
    }

    pub fn as_str(&self) -> String {
        format!("{} {} {}", self.siret, self.role, self.email)
    }

    pub fn as_delimited_row(&self) -> String {
        format_delimited_row([quote(&self.siret), quote(&self.email), quote(&self.role)])
    }
}

impl<S> Checked<RoleRow, S> {
    pub fn as_list(&self) -> Vec<String> {
        let row = self.row();
        vec![
            row.index.to_string(),
            row.siret.clone(),
            row.email.clone(),
            row.role.clone(),
            self.status_label().to_string(),
        ]
    }
}

impl Checked<RoleRow, FieldChecked> {
    /// Collection-level pass: record a duplicate-role error when an earlier
    /// row already carried the same `(siret, email)` pair.
    pub fn mark_duplicate(self, is_duplicate: bool) -> Checked<RoleRow, ReferentialChecked> {
        let duplicate = is_duplicate.then(|| {
            let row = self.row();
            RowError::invalid_field(Tab::Roles, row.index, Field::Email, row.email.clone())
                .with_kind(ErrorKind::DuplicateRole)
        });
        self.advance(duplicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const SIRET: &str = "12345678901234";

    fn record(siret: Value, email: Value, role: Value) -> RawRecord {
        [("siret", siret), ("email", email), ("role", role)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn sirets(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn kinds(checked: &Checked<RoleRow, FieldChecked>) -> Vec<(Field, ErrorKind)> {
        checked.errors().iter().map(|e| (e.field, e.kind)).collect()
    }

    #[test]
    fn empty_record_yields_no_row() {
        assert!(RoleRow::from_record(3, &record(Value::Null, json!(""), Value::Null)).is_none());
    }

    #[test]
    fn valid_role_row() {
        let row = RoleRow::from_record(1, &record(json!(SIRET), json!("a@b.fr"), json!("ADMIN"))).unwrap();
        assert!(row.is_admin());
        assert!(row.validate(&sirets(&[SIRET])).is_valid());
    }

    #[test]
    fn all_four_checks_run_without_short_circuit() {
        let row = RoleRow::from_record(7, &record(json!("123"), json!(""), json!("OWNER"))).unwrap();
        let checked = row.validate(&sirets(&[SIRET]));
        assert_eq!(
            kinds(&checked),
            [
                (Field::Role, ErrorKind::FieldInvalid),
                (Field::Siret, ErrorKind::FieldInvalid),
                (Field::Siret, ErrorKind::SiretMissingFromEstablishments),
                (Field::Email, ErrorKind::FieldInvalid),
            ]
        );
        assert!(checked.errors().iter().all(|e| e.tab == Tab::Roles && e.row_number == 7));
    }

    #[test]
    fn well_formed_siret_can_still_be_missing() {
        let row = RoleRow::from_record(1, &record(json!(SIRET), json!("a@b.fr"), json!("MEMBER"))).unwrap();
        let checked = row.validate(&sirets(&["99999999999999"]));
        assert_eq!(kinds(&checked), [(Field::Siret, ErrorKind::SiretMissingFromEstablishments)]);
    }

    #[test]
    fn duplicate_mark_is_an_increment() {
        let row = RoleRow::from_record(2, &record(json!(SIRET), json!("a@b.fr"), json!("MEMBER"))).unwrap();
        let checked = row.validate(&sirets(&[SIRET])).mark_duplicate(true);
        assert_eq!(checked.errors().len(), 1);
        assert_eq!(checked.increment()[0].kind, ErrorKind::DuplicateRole);
        assert_eq!(checked.as_list().last().map(String::as_str), Some(crate::rows::ERROR_STR));
    }

    #[test]
    fn padded_role_is_not_admin() {
        let row = RoleRow::from_record(1, &record(json!(SIRET), json!("a@b.fr"), json!("ADMIN "))).unwrap();
        assert!(!row.is_admin());
        assert_eq!(kinds(&row.validate(&sirets(&[SIRET]))), [(Field::Role, ErrorKind::FieldInvalid)]);
    }

    #[test]
    fn role_parse_is_case_sensitive() {
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::Member.as_str(), "MEMBER");
    }

    #[test]
    fn delimited_row() {
        let row = RoleRow::from_record(1, &record(json!(SIRET), json!("a@b.fr"), json!("ADMIN"))).unwrap();
        assert_eq!(row.as_delimited_row(), "\"12345678901234\";\"a@b.fr\";\"ADMIN\"");
    }
}
