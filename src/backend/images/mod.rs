//! Images Module
//!
//! Content-addressed storage for recipe images and its HTTP handlers.

/// Image store trait and filesystem backend
pub mod store;

/// Upload, download and delete handlers
pub mod handlers;

pub use store::{FsImageStore, ImageStore};
