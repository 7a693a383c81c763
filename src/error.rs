//! Error types for Reading Tracker
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors fall into three kinds that callers need to tell apart:
//!
//! - **Invalid input**: a request violated a field constraint. Raised by the
//!   validation pass in `reading::input`, before any state is touched.
//! - **Not found**: an operation referenced an identifier with no record.
//! - **Storage failure**: the database collaborator failed. The message is kept
//!   opaque so storage internals never leak to callers.
//!
//! A handful of setup variants (migrations, configuration, file I/O) only occur
//! while opening the storage handle.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias using our TrackerError type
pub type Result<T> = std::result::Result<T, TrackerError>;

/// A single violated constraint on a request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Name of the offending field as it appears in requests
    pub field: String,
    /// Human readable constraint, e.g. "must be at most 255 characters"
    pub constraint: String,
}

impl FieldViolation {
    pub fn new<F: Into<String>, C: Into<String>>(field: F, constraint: C) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.constraint)
    }
}

/// Coarse classification used at the transport boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    StorageFailure,
}

/// Main error type for Reading Tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    // ===== Boundary Errors =====

    /// One or more request fields violated their constraints
    #[error("Invalid input: {}", join_violations(.violations))]
    InvalidInput {
        violations: Vec<FieldViolation>,
    },

    /// Referenced record does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    // ===== Storage Errors =====

    /// Database operation failed
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// File I/O error while preparing the database location
    #[error("File I/O error: {0}")]
    FileIoError(String),

    // ===== Setup Errors =====

    /// Configuration value could not be used
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<sqlx::Error> for TrackerError {
    fn from(err: sqlx::Error) -> Self {
        log::error!("storage error: {}", err);
        // Only the category reaches callers, never SQL or driver detail
        let message = match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => "database unavailable",
            sqlx::Error::RowNotFound => "expected row missing",
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => "stored record is unreadable",
            _ => "database operation failed",
        };
        TrackerError::StorageFailure(message.to_string())
    }
}

// Helper methods for creating common errors
impl TrackerError {
    /// Create a NotFound error for a book identifier
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        TrackerError::NotFound {
            entity: "Book",
            id: id.into(),
        }
    }

    /// Create an InvalidInput error for a single field
    pub fn invalid_field<F: Into<String>, C: Into<String>>(field: F, constraint: C) -> Self {
        TrackerError::InvalidInput {
            violations: vec![FieldViolation::new(field, constraint)],
        }
    }

    /// Create an InvalidInput error from collected violations
    pub fn invalid_input(violations: Vec<FieldViolation>) -> Self {
        TrackerError::InvalidInput { violations }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerError::NotFound { .. })
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, TrackerError::InvalidInput { .. })
    }

    /// Check if error came from the storage collaborator
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            TrackerError::StorageFailure(_)
                | TrackerError::MigrationFailed(_)
                | TrackerError::FileIoError(_)
        )
    }

    /// Violations carried by an InvalidInput error, empty otherwise
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            TrackerError::InvalidInput { violations } => violations,
            _ => &[],
        }
    }

    /// Classify the error for the transport boundary
    ///
    /// Everything that is neither a validation failure nor a missing record is
    /// reported as a storage failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::InvalidInput { .. } => ErrorKind::InvalidInput,
            TrackerError::NotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::StorageFailure,
        }
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            TrackerError::InvalidInput { violations } => {
                let list = violations
                    .iter()
                    .map(|v| format!("  - {}", v))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("The request is invalid:\n{}", list)
            }
            TrackerError::NotFound { entity, id } => {
                format!("{} '{}' does not exist.", entity, id)
            }
            TrackerError::StorageFailure(_) | TrackerError::MigrationFailed(_) => {
                "The library database could not complete the operation. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
