//! xicon-server - F3 Exicon/Lexicon glossary service
//!
//! Serves the exercise and terminology glossaries, takes anonymous
//! submissions and gates moderation behind admin sessions.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use xicon_common::config::{self, ConfigOverrides, TomlConfig};
use xicon_server::{build_router, db, AppState};

/// How often expired admin sessions are purged
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Debug, Parser)]
#[command(name = "xicon-server", version, about = "F3 Exicon/Lexicon glossary service")]
struct Args {
    /// TOML config file (defaults to the platform config location)
    #[arg(long, env = "XICON_CONFIG")]
    config: Option<PathBuf>,

    /// Database name (file stem of the SQLite database)
    #[arg(long)]
    db_name: Option<String>,

    /// Local data directory holding the database
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Managed volume directory (hosted deployments)
    #[arg(long)]
    socket_dir: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:5780
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("xicon_server=info,tower_http=info")),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Xicon server (xicon-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let toml = match &args.config {
        Some(path) => TomlConfig::load(path)?,
        None => TomlConfig::load_default()?,
    };
    let overrides = ConfigOverrides {
        database_name: args.db_name,
        data_dir: args.data_dir,
        socket_dir: args.socket_dir,
        bind: args.bind,
    };
    let resolved = match config::resolve(&overrides, &toml) {
        Ok(resolved) => resolved,
        Err(e) => {
            error!("{}", e);
            return Err(e).context("Configuration incomplete");
        }
    };

    let db_path = resolved.database.database_path();
    if resolved.database.location.is_hosted() {
        info!("Database path (hosted volume): {}", db_path.display());
    } else {
        info!("Database path: {}", db_path.display());
    }

    let pool = db::init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("✓ Database ready");

    match &resolved.admin {
        Some(admin) => db::users::upsert_admin(&pool, &admin.username, &admin.password)
            .await
            .context("Failed to configure admin account")?,
        None => warn!("No admin credentials configured; existing accounts only"),
    }

    let state = AppState::new(pool);

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            sessions.cleanup_expired().await;
        }
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&resolved.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", resolved.bind_addr))?;
    info!("xicon-server listening on http://{}", resolved.bind_addr);
    info!("Health check: http://{}/health", resolved.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("xicon-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
