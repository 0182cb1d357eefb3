//! Error types for amrtracker.
//!
//! This module defines all error types used throughout the amrtracker crate.
//! Validation and empty-store errors are recoverable outcomes of a single user
//! action; the remaining variants come from storage, configuration and I/O.

use std::path::PathBuf;
use thiserror::Error;

use crate::record::ValidationError;

/// The main error type for amrtracker operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// A single field failed validation.
    #[error("invalid {0}")]
    Validation(#[from] ValidationError),

    /// A form submission had one or more invalid fields.
    #[error("invalid submission: {}", format_field_errors(.errors))]
    InvalidSubmission {
        /// Every field that failed, in form order.
        errors: Vec<ValidationError>,
    },

    /// The operation needs at least one record.
    #[error("no data to {operation}")]
    EmptyStore {
        /// Name of the operation that was skipped.
        operation: &'static str,
    },

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
}

/// A specialized Result type for amrtracker operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

fn format_field_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Create an empty-store error for the named operation.
    #[must_use]
    pub fn empty_store(operation: &'static str) -> Self {
        Self::EmptyStore { operation }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error means the store had nothing to operate on.
    #[must_use]
    pub fn is_empty_store(&self) -> bool {
        matches!(self, Self::EmptyStore { .. })
    }

    /// Check if this error is caused by user input rather than the environment.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidSubmission { .. })
    }

    /// The individual field errors carried by this error, if any.
    #[must_use]
    pub fn field_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(err) => std::slice::from_ref(err),
            Self::InvalidSubmission { errors } => errors,
            _ => &[],
        }
    }
}
