//! cld-mock - stand-in analysis backend for local development and tests

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cld_mock::config::{CliOverrides, MockConfig};
use cld_mock::{build_router, AppState, CompanyDb};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "cld-mock")]
#[command(about = "Corporate Lie Detector mock analysis backend", long_about = None)]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "CLD_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// JSON company database, keyed by ticker
    #[arg(short, long)]
    data_file: Option<PathBuf>,

    /// Simulated analysis time for new companies, in milliseconds
    #[arg(long)]
    analysis_delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cli = CliOverrides {
        config_path: args.config,
        port: args.port,
        data_file: args.data_file,
        analysis_delay_ms: args.analysis_delay_ms,
    };
    let config = MockConfig::load(&cli).context("Failed to load configuration")?;

    let level = config.log_level.clone();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("cld_mock={level},tower_http={level}"))),
        )
        .with(fmt::layer())
        .init();

    info!("Starting cld-mock v{}", env!("CARGO_PKG_VERSION"));

    let db = match &config.data_file {
        Some(path) => CompanyDb::load(path)
            .with_context(|| format!("Failed to load company database {}", path.display()))?,
        None => {
            info!("No data file configured, serving built-in sample companies");
            CompanyDb::builtin().context("Built-in company database is invalid")?
        }
    };

    let app = build_router(AppState::new(db, config.analysis_delay));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("cld-mock listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}
