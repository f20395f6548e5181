//! Folio API Server
//!
//! Usage:
//!   folio-api [serve]
//!   folio-api purge-tokens

use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_api::auth::{AuthService, JwtConfig, TokenIssuer};
use folio_api::create_router;
use folio_api::state::{AppState, ContentStores};
use folio_core::config::{AppConfig, ConfigError, LoggingConfig};
use folio_core::RefreshTokenStore;
use folio_store::PgStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio-api")]
#[command(about = "Portfolio content API server")]
#[command(version)]
struct Cli {
    /// TOML configuration file; environment variables still take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Delete expired refresh tokens from the database and exit
    PurgeTokens,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::PurgeTokens => purge_tokens(&config).await,
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json_format {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let (content, auth) = match config.database.url.as_deref() {
        Some(url) => {
            // Writable content is never served ungated
            let jwt = JwtConfig::from_auth_config(&config.auth)?;
            let store = PgStore::connect(url, config.database.pool_size).await?;

            let auth = AuthService::new(
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                TokenIssuer::new(&jwt),
            );
            (ContentStores::postgres(&store), Some(Arc::new(auth)))
        }
        None => {
            if config.auth.is_configured() {
                tracing::warn!("JWT secrets are set but no database is configured; auth is disabled");
            }
            tracing::info!(
                data_dir = %config.content.data_dir.display(),
                "No database configured, serving read-only JSON content"
            );
            (ContentStores::json(&config.content.data_dir), None)
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, content, auth));

    tracing::info!(
        backend = state.content.backend(),
        auth_enabled = state.auth_enabled(),
        "Application state initialized"
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Folio API Server starting on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn purge_tokens(config: &AppConfig) -> anyhow::Result<()> {
    let url = config
        .database
        .url
        .as_deref()
        .ok_or_else(|| ConfigError::MissingRequired("DATABASE_URL".to_string()))?;

    let store = PgStore::connect(url, 1).await?;
    let purged = RefreshTokenStore::delete_expired(&store).await?;

    tracing::info!(purged, "Purged expired refresh tokens");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
