//! Prometheus metrics for dispatches and per-source outcomes.
//!
//! Recording goes through the global `metrics` facade and is a no-op until a
//! [`MetricsCollector`] installs the Prometheus recorder, so the core can be used
//! (and tested) without any exporter.

use crate::types::DispatchOutcome;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::{sync::OnceLock, time::Duration};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn result_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// How one source query ended, as far as metrics are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceResult {
    Success,
    Failure,
    /// The dispatch ended first and cut the call short; says nothing about the upstream.
    Cancelled,
}

impl SourceResult {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Records the envelope produced by one source, whether or not it won.
///
/// Latency is only observed for calls that ran to completion.
pub fn record_source_outcome(source: &str, result: SourceResult, latency: Duration) {
    counter!(
        "cep_source_outcome_total",
        "source" => source.to_string(),
        "result" => result.as_str()
    )
    .increment(1);

    if result != SourceResult::Cancelled {
        histogram!("cep_source_latency_seconds", "source" => source.to_string())
            .record(latency.as_secs_f64());
    }
}

/// Records how a dispatch resolved and how long it took.
pub fn record_dispatch(outcome: &DispatchOutcome, elapsed: Duration) {
    counter!("cep_dispatch_total", "outcome" => outcome.as_metric_str()).increment(1);
    histogram!("cep_dispatch_duration_seconds").record(elapsed.as_secs_f64());

    if let DispatchOutcome::Resolved(envelope) = outcome {
        counter!(
            "cep_dispatch_winner_total",
            "source" => envelope.source.clone(),
            "result" => result_label(envelope.is_success())
        )
        .increment(1);
    }
}

fn try_init_prometheus_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

fn init_prometheus_recorder() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| match try_init_prometheus_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                // Another recorder is already global; keep a local one so rendering works.
                tracing::warn!(error = %e, "using fallback Prometheus recorder");
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Owner of the Prometheus exporter handle used by the `/metrics` endpoint.
#[derive(Clone)]
pub struct MetricsCollector {
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    /// Installs the global Prometheus recorder on first use and returns a collector
    /// sharing its handle.
    #[must_use]
    pub fn new() -> Self {
        Self { prometheus_handle: init_prometheus_recorder() }
    }

    /// Renders all metrics in the Prometheus text exposition format.
    #[must_use]
    pub fn render(&self) -> String {
        self.prometheus_handle.render()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector").finish_non_exhaustive()
    }
}
