//! Backend Error Module
//!
//! This module defines error types specific to the backend server.
//! These errors are used in HTTP handlers and can be converted to HTTP responses.
//!
//! # Architecture
//!
//! - **`types`** - Error type definitions and constructors
//! - **`conversion`** - `IntoResponse` implementation
//!
//! # Error Types
//!
//! | Variant               | Status |
//! |-----------------------|--------|
//! | `Validation`          | 400    |
//! | `Auth`                | 401    |
//! | `WriteAccess`         | 403    |
//! | `NotFound`            | 404    |
//! | `Conflict`            | 409    |
//! | `UpstreamUnavailable` | 502    |
//! | `Internal`            | 500    |
//!
//! # Example
//!
//! ```rust,no_run
//! use recipebook::backend::error::BackendError;
//! use axum::response::Response;
//!
//! # async fn example() -> Result<Response, BackendError> {
//! // Handler can return BackendError directly
//! # Ok(Response::new("OK".into()))
//! # }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
