//! Mock Infrastructure for Testing the CEP race workspace
//!
//! Reusable mock lookup services and helpers for tests that exercise the real
//! HTTP client without reaching the public internet.
//!
//! ## Components
//!
//! - `CepMockBuilder`: Wraps mockito to act as one upstream lookup service
//! - Test helpers for payloads, dispatchers and an in-process server
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::{brasilapi_payload, CepMockBuilder};
//!
//! let mut upstream = CepMockBuilder::new().await;
//! upstream.mock_address("01310100", &brasilapi_payload("01310-100")).await;
//!
//! // Use upstream.endpoint_template() as a source endpoint
//! ```

pub mod cep_mock;
pub mod test_helpers;

pub use cep_mock::CepMockBuilder;
pub use test_helpers::*;
