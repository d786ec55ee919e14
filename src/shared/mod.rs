//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the server and its clients. These types define the JSON bodies of the
//! shopping-list, sync and CRUD endpoints.
//!
//! # Overview
//!
//! Nothing here touches a store or the network. Validation of raw request bodies
//! lives next to the types so that handlers reject malformed input before any
//! state is mutated.

/// Shared error types
pub mod error;

/// Shopping-list items, change events and list references
pub mod shopping;

/// Recipe, category, comment and user rows
pub mod recipes;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use recipes::{Category, Collection, Comment, Recipe, UserSummary};
pub use shopping::{ChangeEvent, ItemRecord, ListOperation, ListReference};
