//! Deterministic [`UpstreamClient`] double keyed by exact request URL.

use crate::upstream::{
    client::{UpstreamClient, UpstreamRequest, UpstreamResponse},
    context::RequestContext,
    errors::UpstreamError,
};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::{collections::HashMap, time::Duration};

/// Error returned for URLs that have neither a response nor an error configured.
pub const UNKNOWN_URL_ERROR: &str = "URL not found in mock";

/// Canned upstream with per-URL responses, errors and delays.
///
/// A configured delay runs before the error or response is returned and is cut short
/// when the request context is cancelled. Errors take precedence over responses.
#[derive(Debug, Default)]
pub struct MockUpstreamClient {
    responses: HashMap<String, UpstreamResponse>,
    errors: HashMap<String, UpstreamError>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockUpstreamClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_response(&mut self, url: impl Into<String>, status: u16, body: impl Into<Bytes>) {
        self.responses.insert(url.into(), UpstreamResponse::new(status, body));
    }

    pub fn set_error(&mut self, url: impl Into<String>, error: UpstreamError) {
        self.errors.insert(url.into(), error);
    }

    pub fn set_delay(&mut self, url: impl Into<String>, delay: Duration) {
        self.delays.insert(url.into(), delay);
    }

    #[must_use]
    pub fn with_json(mut self, url: impl Into<String>, body: &serde_json::Value) -> Self {
        self.set_response(url, 200, body.to_string());
        self
    }

    #[must_use]
    pub fn with_response(
        mut self,
        url: impl Into<String>,
        status: u16,
        body: impl Into<Bytes>,
    ) -> Self {
        self.set_response(url, status, body);
        self
    }

    #[must_use]
    pub fn with_error(mut self, url: impl Into<String>, error: UpstreamError) -> Self {
        self.set_error(url, error);
        self
    }

    #[must_use]
    pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.set_delay(url, delay);
        self
    }

    /// URLs requested so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl UpstreamClient for MockUpstreamClient {
    async fn execute(
        &self,
        ctx: &RequestContext,
        request: &UpstreamRequest,
    ) -> Result<UpstreamResponse, UpstreamError> {
        self.calls.lock().push(request.url.clone());

        if ctx.is_cancelled() {
            return Err(UpstreamError::Cancelled);
        }

        if let Some(delay) = self.delays.get(&request.url) {
            tokio::select! {
                () = tokio::time::sleep(*delay) => {}
                () = ctx.cancelled() => return Err(UpstreamError::Cancelled),
            }
        }

        if let Some(error) = self.errors.get(&request.url) {
            return Err(error.clone());
        }

        self.responses
            .get(&request.url)
            .cloned()
            .ok_or_else(|| UpstreamError::Transport(UNKNOWN_URL_ERROR.to_string()))
    }
}
