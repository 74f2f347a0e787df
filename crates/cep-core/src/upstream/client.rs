use crate::upstream::{context::RequestContext, errors::UpstreamError};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
}

/// A fully formed request to one upstream source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub method: RequestMethod,
    pub url: String,
}

impl UpstreamRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: RequestMethod::Get, url: url.into() }
    }
}

/// Raw upstream answer: status code and undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to perform one network call against one upstream source.
///
/// Implementations must honor `ctx`: once it is cancelled, calls that are in flight or
/// not yet started fail promptly with [`UpstreamError::Cancelled`] instead of blocking.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn execute(
        &self,
        ctx: &RequestContext,
        request: &UpstreamRequest,
    ) -> Result<UpstreamResponse, UpstreamError>;
}
