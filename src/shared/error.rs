//! Shared Error Types
//!
//! This module defines error types that are shared between the server and the
//! client-side stores. Validation failures carry a stable message key (for
//! example `usernameShort` or `typeInvalid`) instead of translated text, so
//! every surface can render them in its own language.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - A field failed one of the validation rules
//! - `FileError` - An attachment was rejected before upload
//!
//! # Usage
//!
//! ```rust
//! use nordaun::shared::error::SharedError;
//!
//! let error = SharedError::validation("username", "usernameShort");
//! assert_eq!(error.code(), "usernameShort");
//! ```
use thiserror::Error;

/// Shared error types that can occur in both server and client code
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {code}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Stable message key
        code: String,
    },

    /// Attachment rejected before upload
    #[error("File '{name}' rejected: {code}")]
    FileError {
        /// Name of the offending file
        name: String,
        /// Stable message key
        code: String,
        /// Extra detail for the key, e.g. the formatted size limit
        detail: Option<String>,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            code: code.into(),
        }
    }

    /// Create a new file error
    pub fn file(name: impl Into<String>, code: impl Into<String>, detail: Option<String>) -> Self {
        Self::FileError {
            name: name.into(),
            code: code.into(),
            detail,
        }
    }

    /// Message key for this error
    pub fn code(&self) -> &str {
        match self {
            Self::SerializationError { .. } => "unexpectedError",
            Self::ValidationError { code, .. } => code,
            Self::FileError { code, .. } => code,
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
