//! Company registry client.
//!
//! Looks establishments up by siret in an Elasticsearch-compatible search
//! index and implements [`massval_core::verification::SiretRegistry`].

pub mod client;
pub mod config;

pub use client::{RegistryClient, RegistryError};
pub use config::RegistryConfig;
