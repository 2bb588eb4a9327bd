//! Unified error type for the ledger, its cascades and the key-value service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i32 },

    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Event not found: {id}")]
    EventNotFound { id: String },

    #[error("Race not found: {id}")]
    RaceNotFound { id: String },

    #[error("Product not found: {id}")]
    ProductNotFound { id: String },

    #[error("Invalid record for '{key}': {message}")]
    InvalidRecord { key: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
