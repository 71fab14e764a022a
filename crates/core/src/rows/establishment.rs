//! Establishment rows, in their create and update shapes.

use serde::{Deserialize, Serialize};

use super::{format_delimited_row, quote, Checked, FieldChecked, ReferentialChecked};
use crate::collections::AdminSirets;
use crate::fields::{self, ImportKind};
use crate::row_error::{ErrorKind, Field, RowError, Tab};
use crate::tabular::{self, RawRecord};
use crate::taxonomy::SubtypeFamily;
use crate::validators;

/// Columns shared by both shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Establishment {
    pub index: usize,
    pub siret: String,
    pub company_types: Vec<String>,
    pub collector_types: Vec<String>,
    pub waste_processor_types: Vec<String>,
    pub waste_vehicles_types: Vec<String>,
}

/// Contact columns, present on create submissions only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub gerep_id: String,
    pub given_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact: String,
    pub website: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstablishmentRow {
    Create {
        establishment: Establishment,
        contact: Contact,
    },
    Update(Establishment),
}

/// Update-row record sent to the downstream bulk update endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecord {
    pub org_id: String,
    pub company_types: Vec<String>,
    pub collector_types: Vec<String>,
    pub waste_processor_types: Vec<String>,
    pub waste_vehicles_types: Vec<String>,
}

impl Establishment {
    fn from_record(index: usize, record: &RawRecord) -> Self {
        Self {
            index,
            siret: tabular::text(record, fields::SIRET),
            company_types: tabular::list(record, fields::COMPANY_TYPES),
            collector_types: tabular::list(record, fields::COLLECTOR_TYPES),
            waste_processor_types: tabular::list(record, fields::WASTE_PROCESSOR_TYPES),
            waste_vehicles_types: tabular::list(record, fields::WASTE_VEHICLES_TYPES),
        }
    }

    pub fn subtypes(&self, family: SubtypeFamily) -> &[String] {
        match family {
            SubtypeFamily::Collector => &self.collector_types,
            SubtypeFamily::WasteProcessor => &self.waste_processor_types,
            SubtypeFamily::WasteVehicles => &self.waste_vehicles_types,
        }
    }

    fn error(&self, field: Field, value: impl Into<serde_json::Value>) -> RowError {
        RowError::invalid_field(Tab::Establishments, self.index, field, value)
    }

    /// Siret, company types, then each subtype family, in that order.
    fn field_errors(&self) -> Vec<RowError> {
        let mut errors = Vec::new();
        if !validators::siret_is_valid(&self.siret) {
            errors.push(self.error(Field::Siret, self.siret.clone()));
        }
        if !validators::company_types_are_valid(&self.company_types) {
            errors.push(self.error(Field::CompanyTypes, self.company_types.clone()));
        }
        for family in SubtypeFamily::ALL {
            let subtypes = self.subtypes(family);
            if !validators::subtypes_are_valid(family, subtypes, &self.company_types) {
                errors.push(self.error(family.field(), subtypes.to_vec()));
            }
        }
        errors
    }

    fn list_cells(&self) -> [String; 4] {
        [
            self.company_types.join(","),
            self.collector_types.join(","),
            self.waste_processor_types.join(","),
            self.waste_vehicles_types.join(","),
        ]
    }
}

impl Contact {
    fn from_record(record: &RawRecord) -> Self {
        Self {
            gerep_id: tabular::text(record, fields::GEREP_ID),
            given_name: tabular::text(record, fields::GIVEN_NAME),
            contact_email: tabular::text(record, fields::CONTACT_EMAIL),
            contact_phone: tabular::text(record, fields::CONTACT_PHONE),
            contact: tabular::text(record, fields::CONTACT),
            website: tabular::text(record, fields::WEBSITE),
        }
    }

    fn field_errors(&self, index: usize) -> Vec<RowError> {
        let mut errors = Vec::new();
        if !validators::phone_is_valid(&self.contact_phone) {
            errors.push(RowError::invalid_field(
                Tab::Establishments,
                index,
                Field::ContactPhone,
                self.contact_phone.clone(),
            ));
        }
        if !validators::optional_email_is_valid(&self.contact_email) {
            errors.push(RowError::invalid_field(
                Tab::Establishments,
                index,
                Field::ContactEmail,
                self.contact_email.clone(),
            ));
        }
        errors
    }
}

impl EstablishmentRow {
    /// Build a row from one data record; a record blank in every column
    /// yields `None` and never enters a collection.
    pub fn from_record(kind: ImportKind, index: usize, record: &RawRecord) -> Option<Self> {
        if tabular::record_is_blank(record) {
            return None;
        }
        let establishment = Establishment::from_record(index, record);
        Some(match kind {
            ImportKind::Create => Self::Create {
                establishment,
                contact: Contact::from_record(record),
            },
            ImportKind::Update => Self::Update(establishment),
        })
    }

    pub fn kind(&self) -> ImportKind {
        match self {
            Self::Create { .. } => ImportKind::Create,
            Self::Update(_) => ImportKind::Update,
        }
    }

    pub fn establishment(&self) -> &Establishment {
        match self {
            Self::Create { establishment, .. } | Self::Update(establishment) => establishment,
        }
    }

    pub fn contact(&self) -> Option<&Contact> {
        match self {
            Self::Create { contact, .. } => Some(contact),
            Self::Update(_) => None,
        }
    }

    pub fn index(&self) -> usize {
        self.establishment().index
    }

    pub fn siret(&self) -> &str {
        &self.establishment().siret
    }

    /// Run every field rule for this shape, recording one error per failing
    /// field. Create rows additionally check contact phone and email.
    pub fn validate(self) -> Checked<Self, FieldChecked> {
        let mut errors = self.establishment().field_errors();
        if let Self::Create { contact, .. } = &self {
            errors.extend(contact.field_errors(self.index()));
        }
        Checked::first(self, errors)
    }

    pub fn as_str(&self) -> String {
        match self {
            Self::Create {
                establishment,
                contact,
            } => format!(
                "{} {} {}",
                establishment.siret, contact.given_name, contact.contact_email
            ),
            Self::Update(establishment) => establishment.siret.clone(),
        }
    }

    /// One delimited line in the column order of this shape's header.
    pub fn as_delimited_row(&self) -> String {
        let e = self.establishment();
        let lists = e.list_cells().map(|l| quote(&l));
        match self {
            Self::Create { contact, .. } => {
                let [company, collector, processor, vehicles] = lists;
                format_delimited_row([
                    quote(&e.siret),
                    quote(&contact.gerep_id),
                    company,
                    collector,
                    processor,
                    vehicles,
                    quote(&contact.given_name),
                    quote(&contact.contact_email),
                    quote(&contact.contact_phone),
                    quote(&contact.contact),
                    quote(&contact.website),
                ])
            }
            Self::Update(_) => {
                format_delimited_row(std::iter::once(quote(&e.siret)).chain(lists))
            }
        }
    }

    /// Structured export for update rows; create rows have none.
    pub fn structured_export(&self) -> Option<UpdateRecord> {
        match self {
            Self::Update(e) => Some(UpdateRecord {
                org_id: e.siret.clone(),
                company_types: e.company_types.clone(),
                collector_types: e.collector_types.clone(),
                waste_processor_types: e.waste_processor_types.clone(),
                waste_vehicles_types: e.waste_vehicles_types.clone(),
            }),
            Self::Create { .. } => None,
        }
    }
}

impl<S> Checked<EstablishmentRow, S> {
    /// `[index, columns…, status]` for tabular display.
    pub fn as_list(&self) -> Vec<String> {
        let row = self.row();
        let e = row.establishment();
        let mut out = vec![row.index().to_string(), e.siret.clone()];
        if let Some(contact) = row.contact() {
            out.push(contact.gerep_id.clone());
            out.extend(e.list_cells());
            out.extend([
                contact.given_name.clone(),
                contact.contact_email.clone(),
                contact.contact_phone.clone(),
                contact.contact.clone(),
                contact.website.clone(),
            ]);
        } else {
            out.extend(e.list_cells());
        }
        out.push(self.status_label().to_string());
        out
    }
}

impl Checked<EstablishmentRow, FieldChecked> {
    /// Second pass: flag the row when no ADMIN role covers its siret.
    pub fn validate_has_admin(self, admins: &AdminSirets) -> Checked<EstablishmentRow, ReferentialChecked> {
        let row = self.row();
        let missing = (!admins.contains(row.siret())).then(|| {
            RowError::invalid_field(
                Tab::Establishments,
                row.index(),
                Field::Siret,
                row.siret().to_string(),
            )
            .with_kind(ErrorKind::SiretHasNoAdmin)
        });
        self.advance(missing)
    }
}
