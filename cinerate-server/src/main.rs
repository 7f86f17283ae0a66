//! cinerate server binary: config load, store connect, route serve.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinerate_config::{ConfigLoader, load_env_file};
use cinerate_core::{PostgresMovieStore, TmdbClient};
use cinerate_server::{AppState, create_api_router};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "cinerate-server")]
#[command(about = "Movie-review backend: metadata proxy, import cache, and rating aggregation")]
struct Cli {
    /// Path to a TOML config file; environment variables still win.
    #[arg(long, env = "CINERATE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen host.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` first so the config loader and CLI env fallbacks see its values.
    load_env_file();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = ConfigLoader::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if !config.tmdb.has_api_key() {
        warn!("no TMDB API key configured; metadata requests will be rejected upstream");
    }

    let database_url = config
        .database
        .url
        .clone()
        .context("DATABASE_URL is not configured")?;
    let store = PostgresMovieStore::connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;
    store
        .run_migrations()
        .await
        .context("failed to run database migrations")?;

    let provider = Arc::new(TmdbClient::new(config.tmdb.clone()));
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid listen address")?;

    let state = AppState::new(Arc::new(config), provider, Arc::new(store));
    let router = create_api_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("cinerate server listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to install shutdown handler: {err}");
        return;
    }
    info!("shutdown signal received");
}
