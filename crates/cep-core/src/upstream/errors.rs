use thiserror::Error;

/// Errors that can occur while calling or decoding an upstream lookup service.
///
/// Every variant is recovered by the source query that produced it and surfaced as the
/// `error` text of a failure envelope; none of them aborts a dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UpstreamError {
    /// The call could not be completed (connection refused, reset, DNS, ...).
    #[error("{0}")]
    Transport(String),

    /// The transport gave up waiting for the upstream.
    #[error("request timeout")]
    Timeout,

    /// The dispatch context was cancelled before the call completed.
    #[error("request cancelled")]
    Cancelled,

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {0}")]
    HttpStatus(u16),

    /// The upstream answered but the body is not a JSON object.
    #[error("{0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl UpstreamError {
    /// Returns a static label for metrics.
    #[must_use]
    pub fn as_metric_str(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::HttpStatus(_) => "http_status",
            Self::Decode(_) => "decode",
            Self::ClientBuild(_) => "client_build",
        }
    }
}
