//! Mock lookup service for postal-code sources.
//!
//! Wraps mockito so each builder behaves like one upstream service answering
//! `GET /cep/<code>`.

use mockito::{Mock, Server, ServerOpts};
use serde_json::Value;
use std::{io::Write, time::Duration};

/// One mocked upstream lookup service.
pub struct CepMockBuilder {
    server: Server,
    mocks: Vec<Mock>,
}

impl CepMockBuilder {
    /// Creates a builder backed by a fresh mockito server.
    pub async fn new() -> Self {
        Self { server: Server::new_with_opts_async(ServerOpts::default()).await, mocks: Vec::new() }
    }

    /// Returns the URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Endpoint template to hand to a source, with the `{cep}` placeholder.
    #[must_use]
    pub fn endpoint_template(&self) -> String {
        format!("{}/cep/{{cep}}", self.server.url())
    }

    fn path_for(code: &str) -> String {
        format!("/cep/{code}")
    }

    /// Answers the lookup for `code` with a JSON object and status 200.
    pub async fn mock_address(&mut self, code: &str, payload: &Value) -> &mut Self {
        let mock = self
            .server
            .mock("GET", Self::path_for(code).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(payload.to_string())
            .create_async()
            .await;

        self.mocks.push(mock);
        self
    }

    /// Answers the lookup for `code` with an arbitrary status and body.
    pub async fn mock_raw(&mut self, code: &str, status: usize, body: &str) -> &mut Self {
        let mock = self
            .server
            .mock("GET", Self::path_for(code).as_str())
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;

        self.mocks.push(mock);
        self
    }

    /// Answers the lookup for `code` with a JSON object whose body arrives after `delay`.
    pub async fn mock_slow_address(
        &mut self,
        code: &str,
        payload: &Value,
        delay: Duration,
    ) -> &mut Self {
        let body = payload.to_string();
        let mock = self
            .server
            .mock("GET", Self::path_for(code).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_chunked_body(move |w: &mut dyn Write| {
                std::thread::sleep(delay);
                w.write_all(body.as_bytes())
            })
            .create_async()
            .await;

        self.mocks.push(mock);
        self
    }

    /// Asserts every registered mock was hit at least once.
    pub async fn assert_all_called(&self) {
        for mock in &self.mocks {
            mock.assert_async().await;
        }
    }
}
