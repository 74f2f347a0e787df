//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `CEP_RACE_CONFIG` env var
//! 3. **Environment variables**: `CEP_RACE__*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`ServerConfig`]: HTTP server settings (bind address, concurrency)
//! - [`DispatchConfig`]: Shared deadline for one lookup
//! - [`SourceConfig`]: Upstream lookup services raced against each other
//! - [`HttpClientConfig`]: Connection settings for upstream calls
//! - [`MetricsConfig`]: Prometheus metrics endpoint
//! - [`LoggingConfig`]: Log level and format
//!
//! # Example
//!
//! ```toml
//! [server]
//! bind_port = 8080
//!
//! [dispatch]
//! budget_ms = 1000
//!
//! [[sources]]
//! name = "BrasilAPI"
//! endpoint = "https://brasilapi.com.br/api/cep/v1/{cep}"
//!
//! [[sources]]
//! name = "ViaCEP"
//! endpoint = "http://viacep.com.br/ws/{cep}/json/"
//! ```

use crate::{
    types::{SourceSpec, CODE_PLACEHOLDER},
    upstream::HttpClientConfig,
};
pub use config::ConfigError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path, time::Duration};

/// HTTP server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Must be greater than 0. Defaults to `8080`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Maximum number of lookups served concurrently. Defaults to `100`.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8080
}

fn default_max_concurrent_requests() -> usize {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Shared deadline for all sources of one lookup, in milliseconds. Defaults to `1000`.
    #[serde(default = "default_budget_ms")]
    pub budget_ms: u64,
}

fn default_budget_ms() -> u64 {
    1000
}

/// One upstream lookup service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    /// Label reported as `source` in envelopes (e.g. "BrasilAPI").
    pub name: String,

    /// URL template; `{cep}` is replaced with the queried code.
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether `/metrics` is exposed. Defaults to `true`.
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset. Defaults to `"info"`.
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    pub format: String,
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,

    #[serde(default)]
    pub http_client: HttpClientConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            name: "BrasilAPI".to_string(),
            endpoint: "https://brasilapi.com.br/api/cep/v1/{cep}".to_string(),
        },
        SourceConfig {
            name: "ViaCEP".to_string(),
            endpoint: "http://viacep.com.br/ws/{cep}/json/".to_string(),
        },
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { budget_ms: default_budget_ms() }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            dispatch: DispatchConfig::default(),
            sources: default_sources(),
            http_client: HttpClientConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `CEP_RACE__` prefix override any value; use `__`
    /// between nested keys (e.g. `CEP_RACE__DISPATCH__BUDGET_MS=1500`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.bind_address", default_bind_address())?
            .set_default("server.bind_port", i64::from(default_bind_port()))?
            .set_default("dispatch.budget_ms", default_budget_ms())?
            .set_default("metrics.enabled", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("CEP_RACE").prefix_separator("__").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Loads configuration from `config/config.toml` with fallback to defaults.
    ///
    /// The path can be overridden with the `CEP_RACE_CONFIG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CEP_RACE_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Returns the shared dispatch deadline as a [`Duration`].
    #[must_use]
    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.dispatch.budget_ms)
    }

    /// Converts configured sources into dispatcher [`SourceSpec`]s, preserving order.
    #[must_use]
    pub fn source_specs(&self) -> Vec<SourceSpec> {
        self.sources.iter().map(|s| SourceSpec::new(s.name.as_str(), s.endpoint.as_str())).collect()
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if the address cannot be parsed into a valid [`SocketAddr`].
    ///
    /// [`SocketAddr`]: std::net::SocketAddr
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port).parse().map_err(|_| {
            format!(
                "Invalid socket address: {}:{}",
                self.server.bind_address, self.server.bind_port
            )
        })
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.sources.is_empty() {
            return Err("No upstream sources configured".to_string());
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(format!("Empty name for source with endpoint {}", source.endpoint));
            }
            if !names.insert(source.name.as_str()) {
                return Err(format!("Duplicate source name: {}", source.name));
            }
            if !source.endpoint.starts_with("http") {
                return Err(format!(
                    "Invalid endpoint for source {}: {}",
                    source.name, source.endpoint
                ));
            }
            if !source.endpoint.contains(CODE_PLACEHOLDER) {
                return Err(format!(
                    "Endpoint for source {} is missing the {CODE_PLACEHOLDER} placeholder",
                    source.name
                ));
            }
        }

        if self.dispatch.budget_ms == 0 {
            return Err("Dispatch budget must be greater than 0".to_string());
        }

        if self.server.max_concurrent_requests == 0 {
            return Err("Max concurrent requests must be greater than 0".to_string());
        }

        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
