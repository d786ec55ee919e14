//! Backend Module
//!
//! All server-side code: an Axum HTTP server over a key/pub-sub store
//! (Redis) and a relational store (PostgreSQL), each with an in-memory
//! stand-in.
//!
//! # Architecture
//!
//! - **`server`** - configuration, application state, startup
//! - **`routes`** - route configuration and router assembly
//! - **`kv`** - key/pub-sub store trait, Redis and in-memory backends
//! - **`shopping`** - change-feed broker, list directory, SSE handlers
//! - **`recipes`** - recipe store trait, PostgreSQL and in-memory backends, CRUD handlers
//! - **`sync`** - checksum sync protocol for collection reads
//! - **`notifications`** - push subscriptions and new-recipe fan-out
//! - **`images`** - content-addressed image storage
//! - **`auth`** - sessions, passwords, login and signup
//! - **`middleware`** - session and body extractors
//! - **`error`** - `BackendError` and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── kv/             - Key/pub-sub stores
//! ├── shopping/       - Live shopping lists
//! ├── recipes/        - Recipe book data
//! ├── sync/           - Checksum sync
//! ├── notifications/  - Web push
//! ├── images/         - Image files
//! ├── auth/           - Authentication
//! ├── middleware/     - Request extractors
//! └── error/          - Error types
//! ```
//!
//! # Delivery Semantics
//!
//! Shopping-list events reach every open stream on the list, the writer's
//! own stream included. New-recipe push notifications skip the session that
//! created the recipe and run on a detached task.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Key/pub-sub stores
pub mod kv;

/// Live shopping lists
pub mod shopping;

/// Recipe book data and handlers
pub mod recipes;

/// Checksum sync protocol
pub mod sync;

/// Push notifications
pub mod notifications;

/// Image storage
pub mod images;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Request extractors
pub mod middleware;

pub use error::BackendError;
pub use server::{create_app, AppState, ServerConfig};
