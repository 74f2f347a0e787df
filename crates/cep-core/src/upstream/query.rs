//! One upstream call turned into exactly one envelope on the outcome channel.

use crate::{
    metrics::{self, SourceResult},
    types::{ResultEnvelope, SourceSpec},
    upstream::{
        client::{UpstreamClient, UpstreamRequest, UpstreamResponse},
        context::RequestContext,
        errors::UpstreamError,
    },
};
use serde_json::{Map, Value};
use std::time::Instant;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// What happened to the envelope a source query produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The envelope was placed on the outcome channel.
    Delivered,
    /// The dispatch had already moved on; the envelope was dropped.
    Abandoned,
}

/// Decodes an upstream body into a field map.
///
/// # Errors
///
/// Returns [`UpstreamError::Decode`] if the body is not valid JSON or is valid JSON but
/// not an object.
pub fn decode_payload(body: &[u8]) -> Result<Map<String, Value>, UpstreamError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(UpstreamError::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(UpstreamError::Decode(format!("invalid JSON payload: {e}"))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn source_result_for(error: &UpstreamError) -> SourceResult {
    if *error == UpstreamError::Cancelled {
        SourceResult::Cancelled
    } else {
        SourceResult::Failure
    }
}

fn interpret(response: UpstreamResponse) -> Result<Map<String, Value>, UpstreamError> {
    if !response.is_success() {
        return Err(UpstreamError::HttpStatus(response.status));
    }
    decode_payload(&response.body)
}

/// Queries one source and delivers exactly one envelope for it onto `outcome_tx`.
///
/// Transport, status and decode failures all become failure envelopes. The send never
/// blocks past cancellation of `ctx`: it succeeds at once when the channel has room and
/// is otherwise abandoned as soon as the context is cancelled.
pub async fn query_source(
    ctx: &RequestContext,
    spec: &SourceSpec,
    code: &str,
    client: &dyn UpstreamClient,
    outcome_tx: &mpsc::Sender<ResultEnvelope>,
) -> Delivery {
    let request = UpstreamRequest::get(spec.url_for(code));
    let start = Instant::now();

    let (envelope, result) = match client.execute(ctx, &request).await.and_then(interpret) {
        Ok(data) => (ResultEnvelope::success(spec.name.as_ref(), data), SourceResult::Success),
        Err(e) => {
            debug!(source = %spec.name, kind = e.as_metric_str(), error = %e, "source query failed");
            (ResultEnvelope::failure(spec.name.as_ref(), e.to_string()), source_result_for(&e))
        }
    };

    let latency = start.elapsed();
    metrics::record_source_outcome(&spec.name, result, latency);
    debug!(
        source = %spec.name,
        success = envelope.is_success(),
        latency_ms = latency.as_millis(),
        "source query finished"
    );

    deliver(ctx, outcome_tx, envelope).await
}

async fn deliver(
    ctx: &RequestContext,
    outcome_tx: &mpsc::Sender<ResultEnvelope>,
    envelope: ResultEnvelope,
) -> Delivery {
    let envelope = match outcome_tx.try_send(envelope) {
        Ok(()) => return Delivery::Delivered,
        Err(TrySendError::Closed(_)) => return Delivery::Abandoned,
        Err(TrySendError::Full(envelope)) => envelope,
    };

    tokio::select! {
        biased;
        sent = outcome_tx.send(envelope) => {
            if sent.is_ok() { Delivery::Delivered } else { Delivery::Abandoned }
        }
        () = ctx.cancelled() => Delivery::Abandoned,
    }
}
