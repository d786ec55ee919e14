//! Realtime integration tests
//!
//! Shopping-list change streams and the writes that feed them

mod shopping_list_test;
