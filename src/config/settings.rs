//! Application settings loaded from config.toml
//!
//! The `[billing]` table controls how the cascades issue invoices and movements
//! (business days until due, ledger categories). `[[event_types]]` lists the event
//! types seeded on startup. Every field has a default, so a missing file is not an
//! error; a malformed one is.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Invoice and movement issuing rules
    #[serde(default)]
    pub billing: BillingSettings,
    /// Event types to seed
    #[serde(default)]
    pub event_types: Vec<EventTypeConfig>,
}

/// Rules shared by the registration, convocation and sale cascades
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BillingSettings {
    /// Business days between issue date and due date
    pub due_business_days: u32,
    /// Ledger category for registration invoices
    pub registration_category: String,
    /// Ledger category for sale invoices
    pub sale_category: String,
    /// Ledger category for convocation movements
    pub convocation_category: String,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            due_business_days: 8,
            registration_category: "inscricoes".to_string(),
            sale_category: "vendas".to_string(),
            convocation_category: "convocatorias".to_string(),
        }
    }
}

/// Configuration for a single seeded event type
#[derive(Debug, Deserialize, Clone)]
pub struct EventTypeConfig {
    /// Unique name of the type
    pub name: String,
    /// Optional grouping (e.g. "competicao", "treino")
    #[serde(default)]
    pub category: Option<String>,
    /// Calendar color
    #[serde(default)]
    pub color: Option<String>,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Loading settings from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `path`, falling back to defaults when the file does not exist.
pub fn load_settings_or_default<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        load_settings(path_ref)
    } else {
        info!(
            "No config file at {}, using default settings.",
            path_ref.display()
        );
        Ok(Settings::default())
    }
}
