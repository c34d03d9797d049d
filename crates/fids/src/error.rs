//! Error types for fids.
//!
//! This module defines the crate-wide error type used by the flight store,
//! configuration layer, display surface and CLI.

use std::path::PathBuf;
use thiserror::Error;

use crate::source::SourceError;

/// The main error type for fids operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Flight Errors ===
    /// Flight form data failed validation.
    #[error("invalid flight: {message}")]
    InvalidFlight {
        /// Description of the validation failure.
        message: String,
    },

    /// No flight exists with the given id.
    #[error("flight not found: {id}")]
    FlightNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A value could not be parsed into a flight field.
    #[error("invalid {field}: {value}")]
    Parse {
        /// Name of the field being parsed.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    // === Display Errors ===
    /// A flight data source failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The display surface rejected an operation.
    #[error("display surface error: {0}")]
    Surface(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for fids operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new surface error.
    #[must_use]
    pub fn surface(message: impl Into<String>) -> Self {
        Self::Surface(message.into())
    }

    /// Create a flight validation error.
    #[must_use]
    pub fn invalid_flight(message: impl Into<String>) -> Self {
        Self::InvalidFlight {
            message: message.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a parse error for the named field.
    #[must_use]
    pub fn parse(field: &'static str, value: impl Into<String>) -> Self {
        Self::Parse {
            field,
            value: value.into(),
        }
    }

    /// Check if this error means a flight id did not resolve.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FlightNotFound { .. })
    }
}
