/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are used in HTTP handlers and can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Expected outcomes of a request that the user can act on. They carry a
 * status code and a stable message key such as `sessionInvalid`,
 * `chatNotFound` or `emailTaken`.
 *
 * ## Validation Errors
 *
 * One or more form fields failed their rules. The response lists every
 * failing field with its keys.
 *
 * ## Infrastructure Errors
 *
 * Database, token, hashing, storage, mail and state failures. They are
 * logged with their cause and surface to clients as `unexpectedError`.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::{FormErrors, SharedError};

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use nordaun::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::NOT_FOUND, "chatNotFound");
/// assert_eq!(err.message(), "chatNotFound");
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing credential, unknown chat)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Stable message key
        message: String,
    },

    /// Form validation failed
    #[error("Validation failed: {errors:?}")]
    ValidationError { errors: FormErrors },

    /// State management error (e.g., an unavailable service)
    #[error("State error: {message}")]
    StateError { message: String },

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Hashing error: {0}")]
    HashError(#[from] bcrypt::BcryptError),

    /// Object storage request failed
    #[error("Storage error: {message}")]
    StorageError { message: String },

    /// Mail could not be built or sent
    #[error("Mail error: {message}")]
    MailError { message: String },
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// 401 with a message key
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    /// 403 with a message key
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::FORBIDDEN, message)
    }

    /// 404 with a message key
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    /// 503 when the database is not configured
    pub fn unavailable() -> Self {
        Self::handler(StatusCode::SERVICE_UNAVAILABLE, "serviceUnavailable")
    }

    /// A single failing field
    pub fn field(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self::ValidationError {
            errors: FormErrors::single(field, code),
        }
    }

    /// Several failing fields
    pub fn validation(errors: FormErrors) -> Self {
        Self::ValidationError { errors }
    }

    /// Create a new state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageError {
            message: message.into(),
        }
    }

    pub fn mail(message: impl Into<String>) -> Self {
        Self::MailError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `ValidationError` - 422 Unprocessable Entity
    /// - `SharedError` - 422 for validation and file errors, 500 otherwise
    /// - Infrastructure errors - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SharedError(err) => match err {
                SharedError::ValidationError { .. } | SharedError::FileError { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::StateError { .. }
            | Self::SerializationError(_)
            | Self::DatabaseError(_)
            | Self::TokenError(_)
            | Self::HashError(_)
            | Self::StorageError { .. }
            | Self::MailError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the message key shown to clients
    ///
    /// Infrastructure errors never leak their cause.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::ValidationError { errors } => errors.pick_error().unwrap_or("invalidForm").to_string(),
            Self::SharedError(err) => err.code().to_string(),
            _ => "unexpectedError".to_string(),
        }
    }

    /// Field errors to include in the response body, if any
    pub fn form_errors(&self) -> Option<FormErrors> {
        match self {
            Self::ValidationError { errors } => Some(errors.clone()),
            Self::SharedError(SharedError::ValidationError { field, code }) => {
                Some(FormErrors::single(field.clone(), code.clone()))
            }
            Self::SharedError(SharedError::FileError { code, .. }) => {
                Some(FormErrors::single("attachment", code.clone()))
            }
            _ => None,
        }
    }

    /// Whether the error is an infrastructure failure rather than a user error
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error() && !matches!(self, Self::HandlerError { .. })
    }
}

impl From<validator::ValidationErrors> for BackendError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::validation(errors.into())
    }
}

impl From<FormErrors> for BackendError {
    fn from(errors: FormErrors) -> Self {
        Self::validation(errors)
    }
}
