//! # cep-core
//!
//! Resolves a postal code (CEP) by racing several upstream lookup services and keeping
//! whichever answers first within a shared deadline.
//!
//! - **[`dispatch`]**: [`RaceDispatcher`] fans one query out to every configured source
//!   and resolves to the first envelope delivered or to a deadline miss.
//! - **[`upstream`]**: the [`UpstreamClient`] capability, its HTTP and mock
//!   implementations, and the per-source query that turns one call into one envelope.
//! - **[`types`]**: [`ResultEnvelope`], [`SourceSpec`] and [`DispatchOutcome`].
//! - **[`config`]**: layered TOML + environment configuration.
//! - **[`metrics`]**: Prometheus counters and histograms for dispatches and sources.
//!
//! ## Request Flow
//!
//! ```text
//!                 ┌────────────────┐
//!   code ───────► │ RaceDispatcher │ ── deadline elapsed ──► DeadlineExceeded
//!                 └───────┬────────┘
//!            spawn one task per source
//!          ┌──────────────┼──────────────┐
//!          ▼              ▼              ▼
//!    query_source   query_source   query_source
//!          │              │              │
//!    UpstreamClient UpstreamClient UpstreamClient
//!          │              │              │
//!          └──────► outcome channel ◄────┘
//!                         │
//!                  first envelope ──► Resolved(envelope)
//! ```

pub mod config;
pub mod dispatch;
pub mod metrics;
pub mod types;
pub mod upstream;

pub use dispatch::{DispatchError, RaceDispatcher, DEFAULT_BUDGET};
pub use types::{DispatchOutcome, ResultEnvelope, SourceSpec};
pub use upstream::{UpstreamClient, UpstreamError};
