//! Member ledger server binary

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use member_ledger::{Config, MemberLedger, Metrics};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::env::var("LEDGER_LOG_JSON").map_or(false, |v| v == "1") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config() -> anyhow::Result<Config> {
    match std::env::var("LEDGER_CONFIG") {
        Ok(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path)),
        Err(_) => Config::from_env().context("Failed to load config from environment"),
    }
}

async fn health_check() -> &'static str {
    "ok"
}

// Prometheus metrics endpoint
async fn metrics_handler(State(metrics): State<Metrics>) -> Result<String, (StatusCode, String)> {
    metrics.export().map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to export metrics: {}", e),
        )
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config()?;
    tracing::info!(
        config = %serde_json::to_string(&config)?,
        "Starting member ledger server"
    );

    let ledger = MemberLedger::open(config.clone())
        .await
        .context("Failed to open ledger")?;
    let stats = ledger.storage_stats()?;
    tracing::info!(
        accounts = stats.total_accounts,
        transactions = stats.total_transactions,
        "Ledger opened successfully"
    );

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(ledger.metrics().clone());

    let listener = tokio::net::TcpListener::bind(&config.metrics_listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.metrics_listen_addr))?;
    tracing::info!(addr = %config.metrics_listen_addr, "Serving /health and /metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    tracing::info!("Shutting down member ledger server");
    ledger.shutdown().await?;
    Ok(())
}
