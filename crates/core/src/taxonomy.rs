//! Company classification taxonomy.
//!
//! Top-level company types plus three subtype families, each of which is
//! only allowed when its parent company type is present on the same row.

use crate::row_error::Field;

// ---------------------------------------------------------------------------
// Company types
// ---------------------------------------------------------------------------

pub const PRODUCER: &str = "PRODUCER";
pub const COLLECTOR: &str = "COLLECTOR";
pub const WASTEPROCESSOR: &str = "WASTEPROCESSOR";
pub const TRANSPORTER: &str = "TRANSPORTER";
pub const WASTE_VEHICLES: &str = "WASTE_VEHICLES";
pub const WASTE_CENTER: &str = "WASTE_CENTER";
pub const TRADER: &str = "TRADER";
pub const BROKER: &str = "BROKER";
pub const ECO_ORGANISME: &str = "ECO_ORGANISME";
pub const WORKER: &str = "WORKER";
pub const INTERMEDIARY: &str = "INTERMEDIARY";

pub const COMPANY_TYPES: &[&str] = &[
    PRODUCER,
    COLLECTOR,
    WASTEPROCESSOR,
    TRANSPORTER,
    WASTE_VEHICLES,
    WASTE_CENTER,
    TRADER,
    BROKER,
    ECO_ORGANISME,
    WORKER,
    INTERMEDIARY,
];

// ---------------------------------------------------------------------------
// Subtype families
// ---------------------------------------------------------------------------

pub const COLLECTOR_TYPES: &[&str] = &[
    "NON_DANGEROUS_WASTES",
    "DANGEROUS_WASTES",
    "DEEE_WASTES",
    "OTHER_NON_DANGEROUS_WASTES",
    "OTHER_DANGEROUS_WASTES",
];

pub const WASTE_PROCESSOR_TYPES: &[&str] = &[
    "DANGEROUS_WASTES_INCINERATION",
    "NON_DANGEROUS_WASTES_INCINERATION",
    "CREMATION",
    "DANGEROUS_WASTES_STORAGE",
    "NON_DANGEROUS_WASTES_STORAGE",
    "INERT_WASTES_STORAGE",
    "OTHER_NON_DANGEROUS_WASTES",
    "OTHER_DANGEROUS_WASTES",
];

pub const WASTE_VEHICLE_TYPES: &[&str] = &["BROYEUR", "DEMOLISSEUR"];

// ---------------------------------------------------------------------------
// User roles
// ---------------------------------------------------------------------------

pub const ROLE_MEMBER: &str = "MEMBER";
pub const ROLE_ADMIN: &str = "ADMIN";
pub const USER_ROLES: &[&str] = &[ROLE_MEMBER, ROLE_ADMIN];

/// A subtype family and the company type that gates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubtypeFamily {
    Collector,
    WasteProcessor,
    WasteVehicles,
}

impl SubtypeFamily {
    /// Families in the order their fields are validated.
    pub const ALL: [SubtypeFamily; 3] = [
        SubtypeFamily::Collector,
        SubtypeFamily::WasteProcessor,
        SubtypeFamily::WasteVehicles,
    ];

    /// The company type that must be present for this family to be non-empty.
    pub fn parent(self) -> &'static str {
        match self {
            Self::Collector => COLLECTOR,
            Self::WasteProcessor => WASTEPROCESSOR,
            Self::WasteVehicles => WASTE_VEHICLES,
        }
    }

    pub fn allowed(self) -> &'static [&'static str] {
        match self {
            Self::Collector => COLLECTOR_TYPES,
            Self::WasteProcessor => WASTE_PROCESSOR_TYPES,
            Self::WasteVehicles => WASTE_VEHICLE_TYPES,
        }
    }

    /// The establishment column holding this family's values.
    pub fn field(self) -> Field {
        match self {
            Self::Collector => Field::CollectorTypes,
            Self::WasteProcessor => Field::WasteProcessorTypes,
            Self::WasteVehicles => Field::WasteVehiclesTypes,
        }
    }
}

pub fn is_company_type(value: &str) -> bool {
    COMPANY_TYPES.contains(&value)
}

pub fn is_user_role(value: &str) -> bool {
    USER_ROLES.contains(&value)
}
