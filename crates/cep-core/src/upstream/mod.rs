//! Upstream lookup services: the call capability and what one source query does with it.
//!
//! - [`UpstreamClient`]: narrow capability performing one network call under a
//!   [`RequestContext`]; [`HttpUpstreamClient`] is the reqwest implementation and
//!   [`MockUpstreamClient`] the canned double used by tests.
//! - [`query_source`]: runs one call for one [`SourceSpec`](crate::types::SourceSpec)
//!   and delivers exactly one envelope onto the dispatcher's outcome channel.

pub mod client;
pub mod context;
pub mod errors;
pub mod http_client;
pub mod mock;
pub mod query;

pub use client::{RequestMethod, UpstreamClient, UpstreamRequest, UpstreamResponse};
pub use context::RequestContext;
pub use errors::UpstreamError;
pub use http_client::{HttpClientConfig, HttpUpstreamClient};
pub use mock::MockUpstreamClient;
pub use query::{decode_payload, query_source, Delivery};
