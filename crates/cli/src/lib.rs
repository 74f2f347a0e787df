//! Command-line client for the CEP race server.
//!
//! Sends one lookup to `GET /consulta?cep=<code>` and prints the winning envelope.

pub mod commands;

pub use commands::{
    fetch_envelope, lookup_url, query_code, render_envelope, CliError, CliResult,
    DEFAULT_SERVER_URL,
};
