//! School Records Server: REST API for students, subjects and grades.
//!
//! Resources live under `/api`. Grades reference a student and a subject and
//! disappear with either of them. Persistence is Postgres (diesel-async) by
//! default, or an in-process store with `--in-memory`.

mod config;
mod error;
mod metrics;
mod migration;
mod models;
mod response;
mod routes;
mod schema;
mod services;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use crate::store::{MemoryStore, PgStore, SchoolStore};

#[derive(Parser)]
#[command(name = "school-records", about = "School records REST API")]
struct Cli {
    /// Server port
    #[arg(short, long, env = "PORT", default_value = "8080")]
    port: u16,

    /// PostgreSQL connection URL (defaults to one built from DB_* variables)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Keep records in process memory instead of Postgres
    #[arg(long)]
    in_memory: bool,

    /// Port for the Prometheus exporter; disabled when unset
    #[arg(long, env = "METRICS_PORT")]
    metrics_port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    }

    let cli = Cli::parse();

    tracing::info!("Starting School Records Server...");

    let store: Arc<dyn SchoolStore> = if cli.in_memory {
        tracing::warn!("Using in-memory store -- records are lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        let server_config = config::ServerConfig::from_env();
        let db_url = cli
            .database_url
            .unwrap_or_else(|| server_config.database_url());

        let pg = PgStore::connect(&db_url, server_config.pool_size)?;
        tracing::info!("Running database migrations...");
        pg.migrate().await?;
        tracing::info!("Database migrations completed.");
        Arc::new(pg)
    };

    if let Some(port) = cli.metrics_port {
        metrics::init_metrics(SocketAddr::from(([0, 0, 0, 0], port)));
        tracing::info!("Prometheus metrics on port {}", port);
    }

    let app = routes::app(routes::AppState::new(store));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    tracing::info!("School Records Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
