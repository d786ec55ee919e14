//! Shopping Lists Module
//!
//! Live shopping lists: per-list state in the key/pub-sub store, a change
//! topic per list, and SSE streams that deliver full snapshots.
//!
//! # Architecture
//!
//! - **`broker`** - `ChangeFeedBroker`: apply write batches, publish snapshots, open streams
//! - **`directory`** - `ListDirectory`: the per-user list of known lists
//! - **`handlers`** - private, public and directory routes

/// Change-feed broker
pub mod broker;

/// Per-user list directory
pub mod directory;

/// HTTP handlers
pub mod handlers;

pub use broker::{topic_for, ChangeFeedBroker, ChangeStream};
pub use directory::ListDirectory;
