/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are used in HTTP handlers and can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * ## Request Errors
 *
 * Raised before any state is touched:
 * - Malformed or incomplete bodies (`Validation`)
 * - Missing or stale sessions (`Auth`)
 * - Read-only accounts attempting writes (`WriteAccess`)
 *
 * ## Resource Errors
 *
 * - Ids that do not resolve inside the caller's group (`NotFound`)
 * - Duplicate unique keys (`Conflict`)
 *
 * ## Upstream Errors
 *
 * Store connection failures are surfaced as `UpstreamUnavailable` and are
 * never retried here.
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::backend::kv::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// Each variant maps to exactly one HTTP status code.
///
/// # Usage
///
/// ```rust
/// use recipebook::backend::error::BackendError;
///
/// let err = BackendError::not_found("Not found");
/// let err = BackendError::auth("Unauthorized access");
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Malformed or incomplete request body
    #[error(transparent)]
    Validation(#[from] SharedError),

    /// Missing or invalid session or credentials
    #[error("{message}")]
    Auth {
        /// Human-readable error message
        message: String,
    },

    /// Authenticated, but the account is read-only
    #[error("no write access")]
    WriteAccess,

    /// The id does not resolve inside the caller's scope
    #[error("{message}")]
    NotFound {
        /// Human-readable error message
        message: String,
    },

    /// Duplicate unique key
    #[error("{message}")]
    Conflict {
        /// Human-readable error message
        message: String,
    },

    /// A backing store could not be reached
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] StoreError),

    /// Unexpected server-side failure
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message
        message: String,
    },
}

impl BackendError {
    /// Create a new authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a new validation error for `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(SharedError::validation(field, message))
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Validation` - 400 Bad Request (500 for serialization failures)
    /// - `Auth` - 401 Unauthorized
    /// - `WriteAccess` - 403 Forbidden
    /// - `NotFound` - 404 Not Found
    /// - `Conflict` - 409 Conflict
    /// - `UpstreamUnavailable` - 502 Bad Gateway
    /// - `Internal` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(err) => match err {
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth { .. } => StatusCode::UNAUTHORIZED,
            Self::WriteAccess => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::Internal { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the response should also drop the client's session cookie
    pub fn clears_session(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(SharedError::from(err))
    }
}
