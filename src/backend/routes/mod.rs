//! Route Configuration Module
//!
//! HTTP routes of the backend, grouped by area.
//!
//! # Architecture
//!
//! - **`router`** - main router creation and route assembly
//! - **`shopping_routes`** - shopping-list streams, writes and directory
//! - **`api_routes`** - sessions, recipe book, images and push

/// Main router creation
pub mod router;

/// Shopping-list routes
pub mod shopping_routes;

/// API endpoint routes
pub mod api_routes;

pub use router::create_router;
