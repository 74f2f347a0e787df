//! End-to-end tests: CLI client → lookup server → mocked upstreams.
//!
//! The server runs in-process on an ephemeral port, so no external services are needed.

use crate::mock_infrastructure::{
    brasilapi_payload, dispatcher_for, spawn_server, viacep_payload, CepMockBuilder,
};
use cep_core::{
    upstream::{HttpUpstreamClient, MockUpstreamClient, UpstreamClient},
    SourceSpec,
};
use cli::{fetch_envelope, query_code, CliError};
use std::{sync::Arc, time::Duration};

const CODE: &str = "01310100";

fn http_client() -> Arc<dyn UpstreamClient> {
    Arc::new(HttpUpstreamClient::new().expect("client builds"))
}

#[tokio::test]
async fn test_cli_round_trip_through_server() {
    let mut upstream = CepMockBuilder::new().await;
    upstream.mock_address(CODE, &brasilapi_payload("01310-100")).await;

    let dispatcher = dispatcher_for(
        http_client(),
        vec![SourceSpec::new("BrasilAPI", upstream.endpoint_template())],
        Duration::from_secs(1),
    );
    let addr = spawn_server(dispatcher).await;

    let client = reqwest::Client::new();
    let mut out = Vec::new();
    query_code(&client, &format!("http://{addr}"), CODE, &mut out).await.expect("lookup succeeds");

    let output = String::from_utf8(out).expect("utf-8 output");
    assert!(output.starts_with("[SUCCESS] Response received from: BrasilAPI\n"));
    assert!(output.contains("  cep: 01310-100\n"));
    assert!(output.contains("  city: São Paulo\n"));
    assert!(output.contains("  neighborhood: Bela Vista\n"));
}

#[tokio::test]
async fn test_envelope_survives_the_wire() {
    let mut brasil = CepMockBuilder::new().await;
    brasil.mock_address(CODE, &brasilapi_payload("01310-100")).await;
    let mut viacep = CepMockBuilder::new().await;
    viacep.mock_address(CODE, &viacep_payload("01310-100")).await;

    let dispatcher = dispatcher_for(
        http_client(),
        vec![
            SourceSpec::new("BrasilAPI", brasil.endpoint_template()),
            SourceSpec::new("ViaCEP", viacep.endpoint_template()),
        ],
        Duration::from_secs(1),
    );
    let addr = spawn_server(dispatcher).await;

    let envelope = fetch_envelope(&reqwest::Client::new(), &format!("http://{addr}"), CODE)
        .await
        .expect("lookup succeeds");

    let expected = match envelope.source.as_str() {
        "BrasilAPI" => brasilapi_payload("01310-100"),
        "ViaCEP" => viacep_payload("01310-100"),
        other => panic!("unexpected source {other}"),
    };
    assert!(envelope.error.is_empty());
    assert_eq!(serde_json::Value::Object(envelope.data), expected);
}

#[tokio::test]
async fn test_cli_prints_failure_envelope_fields() {
    let mut upstream = CepMockBuilder::new().await;
    upstream.mock_raw(CODE, 503, "unavailable").await;

    let dispatcher = dispatcher_for(
        http_client(),
        vec![SourceSpec::new("ViaCEP", upstream.endpoint_template())],
        Duration::from_secs(1),
    );
    let addr = spawn_server(dispatcher).await;

    let mut out = Vec::new();
    query_code(&reqwest::Client::new(), &format!("http://{addr}"), CODE, &mut out)
        .await
        .expect("a failure envelope is still a 200 response");

    assert_eq!(
        String::from_utf8(out).expect("utf-8 output"),
        "[SUCCESS] Response received from: ViaCEP\n  error: upstream returned HTTP 503\n"
    );
}

#[tokio::test]
async fn test_cli_reports_server_timeout() {
    let mock = MockUpstreamClient::new()
        .with_json("https://slow.test/01310100", &brasilapi_payload("01310-100"))
        .with_delay("https://slow.test/01310100", Duration::from_secs(5));

    let dispatcher = dispatcher_for(
        Arc::new(mock),
        vec![SourceSpec::new("Slow", "https://slow.test/{cep}")],
        Duration::from_millis(100),
    );
    let addr = spawn_server(dispatcher).await;

    let result = fetch_envelope(&reqwest::Client::new(), &format!("http://{addr}"), CODE).await;

    match result {
        Err(CliError::Server(status)) => assert_eq!(status, "504 Gateway Timeout"),
        other => panic!("expected a server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cli_reports_missing_cep() {
    let dispatcher = dispatcher_for(
        Arc::new(MockUpstreamClient::new()),
        vec![SourceSpec::new("Unused", "https://unused.test/{cep}")],
        Duration::from_secs(1),
    );
    let addr = spawn_server(dispatcher).await;

    let error = fetch_envelope(&reqwest::Client::new(), &format!("http://{addr}"), "")
        .await
        .expect_err("blank code is rejected");

    assert_eq!(error.to_string(), "server error: 400 Bad Request");
}
