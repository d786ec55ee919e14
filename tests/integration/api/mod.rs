//! API integration tests
//!
//! Integration tests for the request/response endpoints

mod images_test;
mod push_test;
mod recipes_test;
mod sync_test;
