//! Test suite for recipebook
//!
//! This module organizes all tests

pub mod common;
