//! Column layouts and per-kind batch limits.

use serde::{Deserialize, Serialize};

pub const SIRET: &str = "siret";
pub const GEREP_ID: &str = "gerepId";
pub const COMPANY_TYPES: &str = "companyTypes";
pub const COLLECTOR_TYPES: &str = "collectorTypes";
pub const WASTE_PROCESSOR_TYPES: &str = "wasteProcessorTypes";
pub const WASTE_VEHICLES_TYPES: &str = "wasteVehiclesTypes";
pub const GIVEN_NAME: &str = "givenName";
pub const CONTACT_EMAIL: &str = "contactEmail";
pub const CONTACT_PHONE: &str = "contactPhone";
pub const CONTACT: &str = "contact";
pub const WEBSITE: &str = "website";
pub const EMAIL: &str = "email";
pub const ROLE: &str = "role";

/// Expected header of the establishment tab for a create submission.
pub const ESTABLISHMENTS_CREATE_FIELDS: &[&str] = &[
    SIRET,
    GEREP_ID,
    COMPANY_TYPES,
    COLLECTOR_TYPES,
    WASTE_PROCESSOR_TYPES,
    WASTE_VEHICLES_TYPES,
    GIVEN_NAME,
    CONTACT_EMAIL,
    CONTACT_PHONE,
    CONTACT,
    WEBSITE,
];

/// Expected header of the establishment tab for an update submission.
pub const ESTABLISHMENTS_UPDATE_FIELDS: &[&str] = &[
    SIRET,
    COMPANY_TYPES,
    COLLECTOR_TYPES,
    WASTE_PROCESSOR_TYPES,
    WASTE_VEHICLES_TYPES,
];

/// Expected header of the role tab.
pub const ROLES_FIELDS: &[&str] = &[SIRET, EMAIL, ROLE];

pub const ESTABLISHMENTS_TAB_NAME: &str = "etablissements";
pub const ROLES_TAB_NAME: &str = "roles";

pub const MIN_CREATE_ROWS: usize = 10;
pub const MIN_UPDATE_ROWS: usize = 3;
pub const MAX_ROWS: usize = 500;

/// Whether a submission creates new establishments or updates existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Create,
    Update,
}

impl ImportKind {
    pub fn establishment_fields(self) -> &'static [&'static str] {
        match self {
            Self::Create => ESTABLISHMENTS_CREATE_FIELDS,
            Self::Update => ESTABLISHMENTS_UPDATE_FIELDS,
        }
    }

    /// Tabs the workbook must contain, in order.
    pub fn tab_names(self) -> &'static [&'static str] {
        match self {
            Self::Create => &[ESTABLISHMENTS_TAB_NAME, ROLES_TAB_NAME],
            Self::Update => &[ESTABLISHMENTS_TAB_NAME],
        }
    }

    pub fn min_rows(self) -> usize {
        match self {
            Self::Create => MIN_CREATE_ROWS,
            Self::Update => MIN_UPDATE_ROWS,
        }
    }

    pub fn max_rows(self) -> usize {
        MAX_ROWS
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}
