//! Error type shared by the persistence and import/export layers.
//!
//! The deck store itself never surfaces these to callers: load failures degrade to an
//! empty collection and save failures are logged and dropped.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid deck: {0}")]
    InvalidDeck(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
