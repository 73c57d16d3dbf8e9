//! # Error Types
//!
//! Structured error types for form_core. Two channels exist and they never mix:
//!
//! - [`FormError`] is for structural problems (a broken control definition,
//!   unreadable files, bad coordinates). These are returned as `Err` and
//!   propagated with `?` all the way to the caller.
//! - [`ValidationError`] is for values that fail a concept's constraints.
//!   These travel *alongside* every change notification and are merged as
//!   they bubble toward the root. They are never returned as `Err`.
//!
//! ## Example
//!
//! ```rust
//! use form_core::errors::{FormError, FormResult};
//!
//! fn require_id(id: &str) -> FormResult<()> {
//!     if id.is_empty() {
//!         return Err(FormError::missing_field("id"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_id("").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for form_core operations
pub type FormResult<T> = Result<T, FormError>;

/// Structured error type for structural and I/O failures.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum FormError {
    /// An input value is invalid (out of range, wrong shape, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required metadata field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// An edit was addressed to a control id that is not in the tree
    #[error("Unknown control: {control_id}")]
    UnknownControl { control_id: String },

    /// A grid coordinate outside the grid's bounds
    #[error("Invalid location: row {row}, column {column} - {reason}")]
    InvalidLocation {
        row: usize,
        column: usize,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FormError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        FormError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        FormError::MissingField { field: field.into() }
    }

    /// Create an UnknownControl error
    pub fn unknown_control(control_id: impl Into<String>) -> Self {
        FormError::UnknownControl {
            control_id: control_id.into(),
        }
    }

    /// Create an InvalidLocation error
    pub fn invalid_location(row: usize, column: usize, reason: impl Into<String>) -> Self {
        FormError::InvalidLocation {
            row,
            column,
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        FormError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        FormError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FormError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            FormError::InvalidInput { .. } => "INVALID_INPUT",
            FormError::MissingField { .. } => "MISSING_FIELD",
            FormError::UnknownControl { .. } => "UNKNOWN_CONTROL",
            FormError::InvalidLocation { .. } => "INVALID_LOCATION",
            FormError::FileError { .. } => "FILE_ERROR",
            FormError::FileLocked { .. } => "FILE_LOCKED",
            FormError::SerializationError { .. } => "SERIALIZATION_ERROR",
            FormError::VersionMismatch { .. } => "VERSION_MISMATCH",
            FormError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for FormError {
    fn from(e: serde_json::Error) -> Self {
        FormError::SerializationError { reason: e.to_string() }
    }
}

// ============================================================================
// Validation errors
// ============================================================================

/// Severity of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Blocks submission
    Error,
    /// Shown to the user but does not block submission
    Warning,
}

/// A value failed one of its concept's constraints.
///
/// `message` is a translation key; presentation collaborators resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn error(message: impl Into<String>) -> Self {
        ValidationError {
            kind: ErrorKind::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        ValidationError {
            kind: ErrorKind::Warning,
            message: message.into(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.kind == ErrorKind::Error
    }
}

/// Union two error lists, keeping first-seen order and dropping duplicates.
pub fn merge_errors(existing: &[ValidationError], incoming: &[ValidationError]) -> Vec<ValidationError> {
    let mut merged = existing.to_vec();
    for error in incoming {
        if !merged.contains(error) {
            merged.push(error.clone());
        }
    }
    merged
}
