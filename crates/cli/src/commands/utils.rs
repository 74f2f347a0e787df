use std::fmt;

#[derive(Debug)]
pub enum CliError {
    /// The server could not be reached or the connection failed mid-response.
    Network(String),
    /// The server answered with a non-200 status, e.g. `504 Gateway Timeout`.
    Server(String),
    Decode(String),
    Io(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "failed to call server: {msg}"),
            Self::Server(status) => write!(f, "server error: {status}"),
            Self::Decode(msg) => write!(f, "failed to decode response: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<reqwest::Error> for CliError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;

pub fn print_error(message: &str) {
    eprintln!("[ERROR] {message}");
}
