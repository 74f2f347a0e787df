//! First-response-wins fan-out across upstream sources under one shared deadline.

use crate::{
    metrics,
    types::{DispatchOutcome, SourceSpec},
    upstream::{client::UpstreamClient, context::RequestContext, query::query_source},
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default shared deadline for one dispatch.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(1);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("at least one upstream source must be configured")]
    NoSources,

    #[error("dispatch budget must be greater than zero")]
    ZeroBudget,
}

/// Races every configured source and resolves to the first envelope delivered.
///
/// Each call to [`dispatch`](Self::dispatch) gets its own outcome channel and its own
/// [`RequestContext`]; nothing is shared between dispatches except the upstream client.
pub struct RaceDispatcher {
    client: Arc<dyn UpstreamClient>,
    sources: Arc<[SourceSpec]>,
    budget: Duration,
}

impl RaceDispatcher {
    /// Creates a dispatcher over a fixed, ordered list of sources.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NoSources`] for an empty source list and
    /// [`DispatchError::ZeroBudget`] for a zero budget.
    pub fn new(
        client: Arc<dyn UpstreamClient>,
        sources: Vec<SourceSpec>,
        budget: Duration,
    ) -> Result<Self, DispatchError> {
        if sources.is_empty() {
            return Err(DispatchError::NoSources);
        }
        if budget.is_zero() {
            return Err(DispatchError::ZeroBudget);
        }

        Ok(Self { client, sources: sources.into(), budget })
    }

    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    #[must_use]
    pub fn sources(&self) -> &[SourceSpec] {
        &self.sources
    }

    /// Queries every source concurrently for `code`.
    ///
    /// Resolves to the first envelope any source delivers, success or failure, or to
    /// [`DispatchOutcome::DeadlineExceeded`] once the budget elapses. Source tasks still
    /// running afterwards are not aborted; the shared context is cancelled when this
    /// returns, which makes their in-flight calls and pending sends give up.
    pub async fn dispatch(&self, code: &str) -> DispatchOutcome {
        let start = Instant::now();
        let ctx = RequestContext::with_timeout(self.budget);
        let _cancel_on_return = ctx.drop_guard();

        // One slot per source so no task ever waits on delivery.
        let (outcome_tx, mut outcome_rx) = mpsc::channel(self.sources.len());
        let code: Arc<str> = Arc::from(code);

        for spec in self.sources.iter().cloned() {
            let ctx = ctx.clone();
            let client = Arc::clone(&self.client);
            let outcome_tx = outcome_tx.clone();
            let code = Arc::clone(&code);

            tokio::spawn(async move {
                let delivery = query_source(&ctx, &spec, &code, client.as_ref(), &outcome_tx).await;
                debug!(source = %spec.name, ?delivery, "source task finished");
            });
        }
        drop(outcome_tx);

        // Deadline first: sources woken by the deadline itself report "request cancelled",
        // and those envelopes must not win over the timeout.
        let outcome = tokio::select! {
            biased;
            () = tokio::time::sleep_until(ctx.deadline()) => DispatchOutcome::DeadlineExceeded,
            Some(envelope) = outcome_rx.recv() => DispatchOutcome::Resolved(envelope),
        };

        let elapsed = start.elapsed();
        match &outcome {
            DispatchOutcome::Resolved(envelope) => info!(
                cep = %code,
                source = %envelope.source,
                success = envelope.is_success(),
                latency_ms = elapsed.as_millis(),
                "dispatch resolved"
            ),
            DispatchOutcome::DeadlineExceeded => warn!(
                cep = %code,
                budget_ms = self.budget.as_millis(),
                sources = self.sources.len(),
                "no source responded before the deadline"
            ),
        }
        metrics::record_dispatch(&outcome, elapsed);

        outcome
    }
}

impl std::fmt::Debug for RaceDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceDispatcher")
            .field("sources", &self.sources)
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}
