//! Test Helper Functions and Utilities
//!
//! Common payloads and an in-process server for end-to-end runs.

use cep_core::{upstream::UpstreamClient, RaceDispatcher, SourceSpec};
use serde_json::{json, Value};
use server::router::{create_app, AppState};
use std::{net::SocketAddr, sync::Arc, time::Duration};

/// A BrasilAPI-shaped address payload.
#[must_use]
pub fn brasilapi_payload(code: &str) -> Value {
    json!({
        "cep": code,
        "state": "SP",
        "city": "São Paulo",
        "neighborhood": "Bela Vista",
        "street": "Avenida Paulista",
        "service": "open-cep"
    })
}

/// A ViaCEP-shaped address payload.
#[must_use]
pub fn viacep_payload(code: &str) -> Value {
    json!({
        "cep": code,
        "logradouro": "Avenida Paulista",
        "bairro": "Bela Vista",
        "localidade": "São Paulo",
        "uf": "SP",
        "ibge": "3550308"
    })
}

/// Builds a dispatcher over `sources` with the given client and budget.
///
/// # Panics
///
/// Panics if `sources` is empty or `budget` is zero.
#[must_use]
pub fn dispatcher_for(
    client: Arc<dyn UpstreamClient>,
    sources: Vec<SourceSpec>,
    budget: Duration,
) -> RaceDispatcher {
    #[allow(clippy::expect_used)]
    RaceDispatcher::new(client, sources, budget).expect("valid dispatcher")
}

/// Serves the lookup router on an ephemeral localhost port and returns its address.
///
/// # Panics
///
/// Panics if the listener cannot be bound; the server task panics if serving fails.
pub async fn spawn_server(dispatcher: RaceDispatcher) -> SocketAddr {
    #[allow(clippy::expect_used)]
    let listener =
        tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    #[allow(clippy::expect_used)]
    let addr = listener.local_addr().expect("listener address");

    let app = create_app(AppState::new(dispatcher, None), 16);
    tokio::spawn(async move {
        #[allow(clippy::expect_used)]
        axum::serve(listener, app).await.expect("test server stopped with an error");
    });

    addr
}
