use crate::upstream::{
    client::{RequestMethod, UpstreamClient, UpstreamRequest, UpstreamResponse},
    context::RequestContext,
    errors::UpstreamError,
};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Connection settings for [`HttpUpstreamClient`].
///
/// There is no overall request timeout here: every call is bounded by the remaining
/// time of the dispatch context it runs under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// TCP connect timeout in milliseconds. Defaults to `500`.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Idle pooled connections are closed after this many seconds. Defaults to `30`.
    #[serde(default = "default_pool_idle_timeout_secs")]
    pub pool_idle_timeout_secs: u64,

    /// Maximum idle pooled connections per upstream host. Defaults to `16`.
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_connect_timeout_ms() -> u64 {
    500
}

fn default_pool_idle_timeout_secs() -> u64 {
    30
}

fn default_pool_max_idle_per_host() -> usize {
    16
}

fn default_user_agent() -> String {
    concat!("cep-race/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            pool_idle_timeout_secs: default_pool_idle_timeout_secs(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            user_agent: default_user_agent(),
        }
    }
}

/// Plain HTTP GET client backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpUpstreamClient {
    client: Client,
}

// Default is not implemented because building the reqwest client can fail.

impl HttpUpstreamClient {
    /// Creates a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::ClientBuild`] if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, UpstreamError> {
        Self::with_config(&HttpClientConfig::default())
    }

    /// Creates a client with the provided settings.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::ClientBuild`] if the underlying reqwest client fails to build.
    pub fn with_config(config: &HttpClientConfig) -> Result<Self, UpstreamError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::limited(3))
            .user_agent(config.user_agent.as_str())
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                UpstreamError::ClientBuild(e.to_string())
            })?;

        Ok(Self { client })
    }

    /// Maps reqwest failures onto short, host-agnostic descriptions.
    fn sanitize_network_error(error: &reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            return UpstreamError::Timeout;
        }

        let message = if error.is_connect() {
            "connection refused or unreachable"
        } else if error.is_redirect() {
            "too many redirects"
        } else if error.is_body() || error.is_decode() {
            "response body error"
        } else if error.is_request() {
            "request failed"
        } else {
            "network error"
        };
        UpstreamError::Transport(message.to_string())
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        request: &UpstreamRequest,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let builder = match request.method {
            RequestMethod::Get => self.client.get(&request.url),
        };

        let response = builder
            .timeout(ctx.remaining())
            .send()
            .await
            .map_err(|e| Self::sanitize_network_error(&e))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| Self::sanitize_network_error(&e))?;

        Ok(UpstreamResponse { status, body })
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn execute(
        &self,
        ctx: &RequestContext,
        request: &UpstreamRequest,
    ) -> Result<UpstreamResponse, UpstreamError> {
        if ctx.is_cancelled() {
            return Err(UpstreamError::Cancelled);
        }

        let start = Instant::now();
        let result = tokio::select! {
            biased;
            () = ctx.cancelled() => Err(UpstreamError::Cancelled),
            result = self.send(ctx, request) => result,
        };

        tracing::trace!(
            url = %request.url,
            elapsed_ms = start.elapsed().as_millis(),
            ok = result.is_ok(),
            "upstream http call finished"
        );

        result
    }
}
