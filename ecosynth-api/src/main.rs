//! EcoSynth backend - main entry point
//!
//! Single HTTP service hosting submission intake, geotag evidence checks,
//! community vote consensus, and the map data endpoints (threats, eco-scores,
//! predictions, weather, analysis).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecosynth_api::{build_router, db, AppState};
use ecosynth_common::config::Config;
use ecosynth_common::geo::RegionSet;

/// Command-line arguments for the EcoSynth backend
#[derive(Parser, Debug)]
#[command(name = "ecosynth-api")]
#[command(about = "EcoSynth environmental reporting backend")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "ECOSYNTH_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long, env = "ECOSYNTH_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ecosynth_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!("Starting EcoSynth backend on port {}", config.server.port);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Region boundaries are mandatory; the aggregation and scoring
    // endpoints are meaningless without them
    let regions = Arc::new(
        RegionSet::load(&config.regions.path).context("Failed to load region boundaries")?,
    );

    info!("Database: {}", config.database.path.display());
    let db_pool = db::init_database_pool(&config.database.path).await?;
    info!("Database connection established");

    let state = AppState::new(db_pool, &config, regions)
        .context("Failed to initialize application state")?;

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
