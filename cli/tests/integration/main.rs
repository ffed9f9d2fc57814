//! Integration tests for the spire-supply binary
//!
//! These tests spawn the actual binary against temp directories.

#[path = "../common/mod.rs"]
mod common;

mod cli_tests;
