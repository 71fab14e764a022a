//! Structured row errors and their human-readable rendering.
//!
//! Rendering is a pure function of `(kind, field)`; every combination is
//! covered by an exhaustive match so a new field cannot ship without a
//! message.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields;
use crate::taxonomy::{
    COLLECTOR_TYPES, COMPANY_TYPES, USER_ROLES, WASTE_PROCESSOR_TYPES, WASTE_VEHICLE_TYPES,
};

/// What went wrong on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A field failed its own format or membership rule.
    FieldInvalid,
    /// A role references a siret absent from the establishment tab.
    SiretMissingFromEstablishments,
    /// An establishment has no ADMIN row in the role tab.
    SiretHasNoAdmin,
    /// The same `(siret, email)` pair already appeared on an earlier role row.
    DuplicateRole,
}

/// The workbook tab an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Establishments,
    Roles,
}

impl Tab {
    /// Label shown to the operator.
    pub fn label(self) -> &'static str {
        match self {
            Self::Establishments => "Établissements",
            Self::Roles => "Rôles",
        }
    }
}

/// Every column a row error can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "siret")]
    Siret,
    #[serde(rename = "companyTypes")]
    CompanyTypes,
    #[serde(rename = "collectorTypes")]
    CollectorTypes,
    #[serde(rename = "wasteProcessorTypes")]
    WasteProcessorTypes,
    #[serde(rename = "wasteVehiclesTypes")]
    WasteVehiclesTypes,
    #[serde(rename = "contactPhone")]
    ContactPhone,
    #[serde(rename = "contactEmail")]
    ContactEmail,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "role")]
    Role,
}

impl Field {
    /// Column name as it appears in the header.
    pub fn name(self) -> &'static str {
        match self {
            Self::Siret => fields::SIRET,
            Self::CompanyTypes => fields::COMPANY_TYPES,
            Self::CollectorTypes => fields::COLLECTOR_TYPES,
            Self::WasteProcessorTypes => fields::WASTE_PROCESSOR_TYPES,
            Self::WasteVehiclesTypes => fields::WASTE_VEHICLES_TYPES,
            Self::ContactPhone => fields::CONTACT_PHONE,
            Self::ContactEmail => fields::CONTACT_EMAIL,
            Self::Email => fields::EMAIL,
            Self::Role => fields::ROLE,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single recoverable problem found on one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row_number: usize,
    pub field: Field,
    pub field_value: Value,
    pub kind: ErrorKind,
    pub tab: Tab,
}

impl RowError {
    /// A [`ErrorKind::FieldInvalid`] error.
    pub fn invalid_field(tab: Tab, row_number: usize, field: Field, value: impl Into<Value>) -> Self {
        Self {
            row_number,
            field,
            field_value: value.into(),
            kind: ErrorKind::FieldInvalid,
            tab,
        }
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// The offending value as shown to the operator; lists are comma-joined.
    pub fn displayable_value(&self) -> String {
        match &self.field_value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        }
    }

    /// Short technical summary, e.g. for logs.
    pub fn as_str(&self) -> String {
        let name = self.field.name();
        let mut chars = name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!(
            "{capitalized} error on row n°{} value={}",
            self.row_number,
            self.displayable_value()
        )
    }

    /// Operator-facing explanation.
    pub fn message(&self) -> String {
        render_message(self.kind, self.field)
    }

    pub fn render(&self) -> RenderedError {
        RenderedError {
            tab: self.tab.label(),
            row_number: self.row_number,
            field: self.field.name(),
            value: self.displayable_value(),
            kind: self.kind,
            message: self.message(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// Display-ready view of a [`RowError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedError {
    pub tab: &'static str,
    pub row_number: usize,
    pub field: &'static str,
    pub value: String,
    pub kind: ErrorKind,
    pub message: String,
}

pub fn render_message(kind: ErrorKind, field: Field) -> String {
    match kind {
        ErrorKind::SiretMissingFromEstablishments => {
            "Siret absent de l'onglet établissements".to_string()
        }
        ErrorKind::SiretHasNoAdmin => {
            "Le siret n'a pas d'ADMIN identifié dans l'onglet rôles".to_string()
        }
        ErrorKind::DuplicateRole => {
            "Le rôle est dupliqué, un email ne peut être associé à un siret qu'une seule fois"
                .to_string()
        }
        ErrorKind::FieldInvalid => field_message(field),
    }
}

fn field_message(field: Field) -> String {
    match field {
        Field::Siret => {
            "Format de siret incorrect, un siret est composé de 14 chiffres".to_string()
        }
        Field::CompanyTypes => format!(
            "Le champ companyTypes accepte uniquement les valeurs {} séparées par des virgules",
            COMPANY_TYPES.join(",")
        ),
        Field::CollectorTypes => format!(
            "Le champ collectorTypes accepte uniquement les valeurs {} séparées par des virgules. \
             Le champ companyTypes doit contenir COLLECTOR.",
            COLLECTOR_TYPES.join(",")
        ),
        Field::WasteProcessorTypes => format!(
            "Le champ wasteProcessorTypes accepte uniquement les valeurs {} séparées par des virgules. \
             Le champ companyTypes doit contenir WASTEPROCESSOR.",
            WASTE_PROCESSOR_TYPES.join(",")
        ),
        Field::WasteVehiclesTypes => format!(
            "Le champ wasteVehiclesTypes accepte uniquement les valeurs {} séparées par des virgules. \
             Le champ companyTypes doit contenir WASTE_VEHICLES.",
            WASTE_VEHICLE_TYPES.join(",")
        ),
        Field::ContactPhone => {
            "Numéro de téléphone incorrect, format attendu : 0X XX XX XX XX".to_string()
        }
        Field::ContactEmail | Field::Email => {
            "Valeur incorrecte, les adresses emails doivent être correctement formées".to_string()
        }
        Field::Role => format!(
            "Le champ role accepte uniquement les valeurs {}",
            USER_ROLES.join(",")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn referential_kinds_ignore_the_field() {
        assert_eq!(
            render_message(ErrorKind::SiretHasNoAdmin, Field::Siret),
            render_message(ErrorKind::SiretHasNoAdmin, Field::Email)
        );
        assert!(render_message(ErrorKind::DuplicateRole, Field::Email).contains("dupliqué"));
    }

    #[test]
    fn field_messages_name_their_taxonomy() {
        let msg = render_message(ErrorKind::FieldInvalid, Field::CollectorTypes);
        assert!(msg.contains("DEEE_WASTES"));
        assert!(msg.contains("COLLECTOR."));
        let msg = render_message(ErrorKind::FieldInvalid, Field::Role);
        assert!(msg.ends_with("MEMBER,ADMIN"));
    }

    #[test]
    fn list_values_are_comma_joined_for_display() {
        let err = RowError::invalid_field(
            Tab::Establishments,
            4,
            Field::CompanyTypes,
            json!(["PRODUCER", "PLOP"]),
        );
        assert_eq!(err.displayable_value(), "PRODUCER,PLOP");
        assert_eq!(err.as_str(), "CompanyTypes error on row n°4 value=PRODUCER,PLOP");
    }

    #[test]
    fn render_carries_tab_label_and_kind() {
        let err = RowError::invalid_field(Tab::Roles, 2, Field::Email, "x")
            .with_kind(ErrorKind::DuplicateRole);
        let rendered = err.render();
        assert_eq!(rendered.tab, "Rôles");
        assert_eq!(rendered.field, "email");
        assert_eq!(rendered.kind, ErrorKind::DuplicateRole);
        assert_eq!(rendered.message, err.message());
    }

    #[test]
    fn field_serializes_as_column_name() {
        assert_eq!(serde_json::to_value(Field::WasteVehiclesTypes).unwrap(), json!("wasteVehiclesTypes"));
        assert_eq!(serde_json::to_value(ErrorKind::FieldInvalid).unwrap(), json!("field_invalid"));
    }
}
