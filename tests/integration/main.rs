//! Integration tests for the extraction engine
//!
//! These tests use wiremock to create mock HTTP servers and drive full
//! parsing runs end-to-end.

mod common;
mod output_tests;
mod run_tests;
