/// Database configuration and connection management
pub mod database;

/// Billing and seed settings loaded from config.toml
pub mod settings;
