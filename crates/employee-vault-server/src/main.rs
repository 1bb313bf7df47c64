//! Employee Vault server entry point.
//!
//! Loads the INI configuration, probes the secret service, wires the transit
//! cipher and the credential-leasing Postgres store into shared state, then
//! serves the HTML routes with graceful shutdown.

use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::Router;
use axum::http::HeaderValue;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use employee_vault_client::{CredentialBroker, VaultClient};
use employee_vault_server::config::AppConfig;
use employee_vault_server::routes;
use employee_vault_server::state::AppState;
use employee_vault_storage::PostgresStore;

/// Employee records web app backed by Vault transit encryption and
/// dynamic database credentials.
#[derive(Debug, Parser)]
#[command(name = "employee-vault", version, about)]
struct Args {
    /// INI file with `[Vault]` and `[Database]` sections.
    #[arg(long, env = "EMPLOYEE_VAULT_CONFIG", default_value = "config.ini")]
    config: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "EMPLOYEE_VAULT_BIND", default_value = "0.0.0.0:5000")]
    bind: SocketAddr,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "EMPLOYEE_VAULT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also append log lines to this file.
    #[arg(long, env = "EMPLOYEE_VAULT_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Maximum requests handled at once. Each request may hold a lease and
    /// a database connection.
    #[arg(long, env = "EMPLOYEE_VAULT_MAX_CONCURRENCY", default_value_t = 64)]
    max_concurrency: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level, args.log_file.as_deref())?;

    let config = AppConfig::load(&args.config).map_err(|e| {
        let reason = format!("{e:#}");
        error!(path = %args.config.display(), error = %reason, "invalid configuration");
        e
    })?;
    info!(
        config = %args.config.display(),
        vault_addr = %config.vault.vault_addr,
        db_host = %config.database.host,
        db_name = %config.database.dbname,
        "Employee Vault starting"
    );

    let client = Arc::new(
        VaultClient::new(config.vault_client_config()).context("failed to build vault client")?,
    );

    // Connectivity probe only; the server starts either way.
    match client.health().await {
        Ok(status) => info!(status, addr = %client.addr(), "vault health check"),
        Err(e) => error!(addr = %client.addr(), error = %e, "vault connectivity test failed"),
    }

    let broker: Arc<dyn CredentialBroker> = client.clone();
    let store = PostgresStore::new(broker, config.database_target());
    let state = Arc::new(AppState::new(client, Arc::new(store)));

    let app = build_router(state, args.max_concurrency);

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind to {}", args.bind))?;

    info!(addr = %args.bind, "Employee Vault listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Employee Vault stopped");
    Ok(())
}

/// JSON logs to stdout, and to `log_file` as well when given.
fn init_tracing(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).json();

    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_writer(std::io::stdout.and(Mutex::new(file)))
                .try_init()
        }
        None => builder.try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

fn build_router(state: Arc<AppState>, max_concurrency: usize) -> Router {
    routes::router()
        .layer(tower::limit::GlobalConcurrencyLimitLayer::new(max_concurrency.max(1)))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
