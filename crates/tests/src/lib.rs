//! Integration and End-to-End Tests for the CEP race workspace
//!
//! This crate contains:
//!
//! - `race_tests`: Dispatcher races over real HTTP against mocked upstream services
//! - `e2e_tests`: CLI client → lookup server → upstreams, all in-process
//! - `mock_infrastructure`: Reusable mockito-backed upstreams and helpers
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```
//!
//! Nothing here reaches the public internet; every upstream is a local mockito server.


#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod e2e_tests;

/// Mock infrastructure for testing
pub mod mock_infrastructure;
