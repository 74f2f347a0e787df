use crate::middleware::create_request_id_layers;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use cep_core::{metrics::MetricsCollector, DispatchOutcome, RaceDispatcher};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tower::limit::ConcurrencyLimitLayer;
use tracing::debug;

/// Path of the lookup endpoint.
pub const LOOKUP_PATH: &str = "/consulta";

/// Body of the 400 response when the `cep` parameter is missing or blank.
pub const MISSING_CEP_MESSAGE: &str = "cep is required";

/// Shared state handed to every handler.
pub struct AppState {
    pub dispatcher: RaceDispatcher,
    /// `None` when metrics are disabled.
    pub metrics: Option<MetricsCollector>,
}

impl AppState {
    #[must_use]
    pub fn new(dispatcher: RaceDispatcher, metrics: Option<MetricsCollector>) -> Arc<Self> {
        Arc::new(Self { dispatcher, metrics })
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub cep: Option<String>,
}

/// Renders a budget as `1s` for whole seconds and `1500ms` otherwise.
fn format_budget(budget: Duration) -> String {
    let millis = budget.as_millis();
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{millis}ms")
    }
}

/// Body of the 504 response for a dispatch with the given budget.
#[must_use]
pub fn timeout_message(budget: Duration) -> String {
    format!("timeout: no upstream responded within {}", format_budget(budget))
}

/// Handles `GET /consulta?cep=<code>`.
///
/// The winning envelope is returned as-is with status 200, even when it is a failure
/// envelope; only a deadline miss maps to 504.
pub async fn handle_lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Response {
    let Some(cep) = params.cep.as_deref().map(str::trim).filter(|cep| !cep.is_empty()) else {
        debug!("lookup rejected: missing cep parameter");
        return (StatusCode::BAD_REQUEST, MISSING_CEP_MESSAGE).into_response();
    };

    match state.dispatcher.dispatch(cep).await {
        DispatchOutcome::Resolved(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        DispatchOutcome::DeadlineExceeded => {
            (StatusCode::GATEWAY_TIMEOUT, timeout_message(state.dispatcher.budget()))
                .into_response()
        }
    }
}

pub async fn handle_metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(collector) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            collector.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sources: Vec<&str> =
        state.dispatcher.sources().iter().map(|spec| spec.name.as_ref()).collect();

    Json(serde_json::json!({
        "status": "healthy",
        "sources": sources,
        "budget_ms": u64::try_from(state.dispatcher.budget().as_millis()).unwrap_or(u64::MAX),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Builds the application router with request-id and concurrency-limit layers.
pub fn create_app(state: Arc<AppState>, max_concurrent_requests: usize) -> Router {
    let (set_request_id, propagate_request_id) = create_request_id_layers();

    let mut app = Router::new()
        .route(LOOKUP_PATH, get(handle_lookup))
        .route("/health", get(handle_health));

    if state.metrics.is_some() {
        app = app.route("/metrics", get(handle_metrics));
    }

    app.with_state(state)
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests))
        // Layers run in reverse order, so propagate runs after set.
        .layer(propagate_request_id)
        .layer(set_request_id)
}
