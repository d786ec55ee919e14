//! Recipebook - Main Library
//!
//! Backend of a shared recipe book with live shopping lists.
//!
//! # Overview
//!
//! - Multi-tenant recipes, categories and comments, scoped by user group
//! - Checksum-based incremental sync: unchanged collections answer 204
//! - Shopping lists streamed over Server-Sent Events, one full snapshot per change
//! - Browser push notifications for new recipes
//!
//! # Module Structure
//!
//! - **`shared`** - wire types and their validation
//!   - Shopping-list items, change events, list references
//!   - Recipe book rows and request bodies
//!   - Validation errors
//!
//! - **`backend`** - the Axum server
//!   - Stores (key/pub-sub, relational, images)
//!   - Change-feed broker, sync protocol, push fan-out
//!   - Sessions, routes, configuration
//!
//! # Usage
//!
//! ```rust,no_run
//! use recipebook::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
