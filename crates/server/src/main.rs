use anyhow::Result;
use axum::serve;
use cep_core::{
    config::AppConfig, metrics::MetricsCollector, upstream::HttpUpstreamClient, RaceDispatcher,
};
use rustls::crypto::{ring::default_provider, CryptoProvider};
use server::router::{self, AppState};
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system based on the configuration.
fn init_logging(config: &AppConfig) {
    let crates_at = |level: &str| format!("warn,cep_core={level},server={level}");

    let filter = match std::env::var("RUST_LOG").as_deref() {
        Ok("debug") => EnvFilter::new(crates_at("debug")),
        Ok("trace") => EnvFilter::new(crates_at("trace")),
        Ok(_) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(crates_at(&config.logging.level))),
        Err(_) => EnvFilter::new(crates_at(&config.logging.level)),
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).init();
    }
}

fn init_state(config: &AppConfig) -> Result<Arc<AppState>> {
    let client = HttpUpstreamClient::with_config(&config.http_client)
        .map_err(|e| anyhow::anyhow!("Upstream client initialization failed: {e}"))?;

    let dispatcher = RaceDispatcher::new(Arc::new(client), config.source_specs(), config.budget())
        .map_err(|e| anyhow::anyhow!("Dispatcher initialization failed: {e}"))?;

    let metrics = config.metrics.enabled.then(MetricsCollector::new);

    Ok(AppState::new(dispatcher, metrics))
}

#[tokio::main]
async fn main() -> Result<()> {
    CryptoProvider::install_default(default_provider())
        .map_err(|e| anyhow::anyhow!("Failed to install crypto provider: {e:?}"))?;

    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("Configuration load failed: {e}"))?;
    config.validate().map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

    init_logging(&config);
    info!("Starting CEP race server");
    debug!(
        sources = ?config.sources.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        budget_ms = config.dispatch.budget_ms,
        metrics_enabled = config.metrics.enabled,
        "Configuration loaded"
    );

    let state = init_state(&config)?;
    let app = router::create_app(state, config.server.max_concurrent_requests);

    let addr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, path = router::LOOKUP_PATH, "CEP race server listening");

    if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error occurred");
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
