//! Middleware Module
//!
//! Request extractors that run before handlers: session resolution and
//! permissive JSON body parsing.
//!
//! # Architecture
//!
//! - **`auth`** - `SessionContext` and `Requester` extractors
//! - **`body`** - `JsonBody`, an untyped JSON body with validation-style rejections
//!
//! # Example
//!
//! ```rust,no_run
//! use recipebook::backend::middleware::{JsonBody, Requester};
//!
//! async fn handler(requester: Requester, JsonBody(body): JsonBody) {
//!     // requester.ensure_write_access()?;
//! }
//! ```

pub mod auth;

pub mod body;

pub use auth::{Requester, SessionContext};
pub use body::JsonBody;
