use super::utils::{CliError, CliResult};
use cep_core::ResultEnvelope;
use reqwest::StatusCode;
use serde_json::Value;
use std::io::Write;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Path of the server's lookup endpoint.
pub const LOOKUP_PATH: &str = "/consulta";

/// Builds the lookup URL without the query string.
#[must_use]
pub fn lookup_url(server_url: &str) -> String {
    format!("{}{LOOKUP_PATH}", server_url.trim_end_matches('/'))
}

/// Sends one lookup and decodes the envelope.
///
/// # Errors
///
/// [`CliError::Network`] when the request fails, [`CliError::Server`] for any status other
/// than 200 and [`CliError::Decode`] when the body is not an envelope.
pub async fn fetch_envelope(
    client: &reqwest::Client,
    server_url: &str,
    code: &str,
) -> CliResult<ResultEnvelope> {
    let response = client.get(lookup_url(server_url)).query(&[("cep", code)]).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(CliError::Server(status.to_string()));
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Writes the success banner followed by one indented line per data field.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn render_envelope<W: Write>(envelope: &ResultEnvelope, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "[SUCCESS] Response received from: {}", envelope.source)?;
    for (key, value) in &envelope.data {
        writeln!(out, "  {key}: {}", display_value(value))?;
    }
    if !envelope.is_success() {
        writeln!(out, "  error: {}", envelope.error)?;
    }
    Ok(())
}

/// Looks up `code` on the server at `server_url` and prints the result to `out`.
///
/// # Errors
///
/// See [`fetch_envelope`]; write failures surface as [`CliError::Io`].
pub async fn query_code<W: Write>(
    client: &reqwest::Client,
    server_url: &str,
    code: &str,
    out: &mut W,
) -> CliResult<()> {
    let envelope = fetch_envelope(client, server_url, code).await?;
    render_envelope(&envelope, out)?;
    Ok(())
}
