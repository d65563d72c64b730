//! Error types shared by the normalizer, the store, ingestion and the HTTP layer

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur anywhere in eldendata
#[derive(Error, Debug)]
pub enum EldenDataError {
    /// A document or payload failed entity validation after normalization
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested document does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed document identifier, rejected before any store access
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Request parameters that can never be satisfied
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A source file named by the ingestion plan is absent
    #[error("Source file missing: {}", .0.display())]
    IngestionFileMissing(PathBuf),

    /// The document store could not be opened or reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Database errors
    #[error("Database error: {0}")]
    Store(#[from] sled::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    /// CSV reader errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file parse errors
    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

impl EldenDataError {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new invalid identifier error
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    /// Create a new bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create a new store unavailable error
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short machine-readable name used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::BadRequest(_) => "bad_request",
            Self::IngestionFileMissing(_) => "ingestion_file_missing",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Store(_) => "database_error",
            Self::Serde(_) => "serialization_error",
            Self::Csv(_) => "csv_error",
            Self::Io(_) => "io_error",
            Self::Config(_) | Self::TomlDe(_) => "configuration_error",
        }
    }
}

/// Result type for eldendata operations
pub type EldenDataResult<T> = std::result::Result<T, EldenDataError>;
