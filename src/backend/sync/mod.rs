//! Checksum Sync Module
//!
//! Cheap "did anything change" polling for the recipe, category, comment and
//! user collections.
//!
//! # Architecture
//!
//! - **`protocol`** - `sync_collection` and the `204`/payload response type
//! - **`handlers`** - `GET` handlers for the four collections

/// Sync exchange and response encoding
pub mod protocol;

/// Collection read handlers
pub mod handlers;

pub use protocol::{sync_collection, SyncOutcome, SyncResponse, NO_CHECKSUM};
