//! cld-ui - Corporate Lie Detector terminal client
//!
//! Search the organization directory, list the portfolio, onboard a new
//! organization and inspect its verification results.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cld_common::events::CldEvent;
use cld_ui::config::{CliOverrides, ClientConfig};
use cld_ui::{render, AppContext};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "cld-ui")]
#[command(about = "Corporate Lie Detector client", long_about = None)]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "CLD_CONFIG")]
    config: Option<PathBuf>,

    /// Analysis backend base URL, e.g. http://127.0.0.1:8000/api
    #[arg(short, long, env = "CLD_BACKEND_URL")]
    backend_url: Option<String>,

    /// JSON file replacing the built-in organization directory
    #[arg(long)]
    directory_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the organization directory
    Search { query: String },

    /// Search as you type: one query per stdin line
    Browse,

    /// List portfolio organizations
    Portfolio,

    /// Onboard an organization and wait for its analysis
    Add {
        name: String,

        #[arg(long)]
        ticker: Option<String>,

        /// Look the organization up by domain instead of name
        #[arg(long)]
        domain: Option<String>,
    },

    /// Show verification results for a ticker
    Show { ticker: String },

    /// Write the effective settings to a TOML file
    InitConfig {
        /// Destination; defaults to the platform config directory
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cli = CliOverrides {
        config_path: args.config.clone(),
        backend_url: args.backend_url.clone(),
        directory_file: args.directory_file.clone(),
    };
    let config = ClientConfig::load(&cli).context("Failed to load configuration")?;

    let level = config.log_level.clone();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("cld_ui={level},cld_common={level}"))),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting cld-ui v{}", env!("CARGO_PKG_VERSION"));

    if let Command::InitConfig { path } = &args.command {
        let written = config.write(path.as_deref()).context("Failed to write config file")?;
        println!("Wrote {}", written.display());
        return Ok(());
    }

    let ctx = AppContext::from_config(config)?;

    match args.command {
        Command::Search { query } => {
            print!("{}", render::search_results(&query, &ctx.directory.search(&query)));
        }
        Command::Browse => browse(&ctx).await?,
        Command::Portfolio => {
            ctx.portfolio.refresh().await.context("Failed to load portfolio")?;
            print!("{}", render::portfolio(&ctx.portfolio.list().await));
        }
        Command::Add { name, ticker, domain } => add(&ctx, &name, ticker, domain).await?,
        Command::Show { ticker } => {
            let view = ctx
                .detail
                .load(&ticker)
                .await
                .with_context(|| format!("Failed to load {}", ticker))?;
            print!("{}", render::verification(&view));
        }
        Command::InitConfig { .. } => {}
    }

    Ok(())
}

async fn browse(ctx: &AppContext) -> Result<()> {
    let debouncer = ctx.search_debouncer();
    let mut results = debouncer.subscribe();

    let printer = tokio::spawn(async move {
        while results.changed().await.is_ok() {
            let latest = results.borrow_and_update().clone();
            print!("{}", render::search_results(&latest.query, &latest.results));
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        debouncer.schedule(&line);
    }

    // Let the last query through before exiting
    tokio::time::sleep(ctx.config.search_debounce + Duration::from_millis(50)).await;
    printer.abort();
    Ok(())
}

async fn add(
    ctx: &AppContext,
    name: &str,
    ticker: Option<String>,
    domain: Option<String>,
) -> Result<()> {
    // Duplicate check needs the current listing
    if let Err(e) = ctx.portfolio.refresh().await {
        warn!(error = %e, "Could not load portfolio before submitting");
    }

    let resolved = domain
        .as_deref()
        .and_then(|d| ctx.directory.resolve(d))
        .or_else(|| ctx.directory.resolve(name))
        .cloned();
    let target_name = resolved.as_ref().map(|o| o.name.clone()).unwrap_or_else(|| name.to_string());
    let ticker = ticker.or_else(|| resolved.and_then(|o| o.ticker));

    let mut events = ctx.event_bus.subscribe();
    let onboarding = ctx.onboarding.clone();
    let reporter = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(CldEvent::OnboardingProgress { step, max_step, .. }) => {
                    match onboarding.current_job().await {
                        Some(job) => eprintln!("{}", render::job_status(&job)),
                        None => eprintln!("{}", render::progress_line(step, max_step)),
                    }
                }
                Ok(CldEvent::OnboardingStateChanged { new_state, message, .. }) => {
                    match (onboarding.current_job().await, message) {
                        (Some(job), _) if job.state == new_state => {
                            eprintln!("{}", render::job_status(&job))
                        }
                        (_, Some(message)) => eprintln!("{}: {}", new_state, message),
                        (_, None) => eprintln!("{}", new_state),
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Progress reporter lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let outcome = tokio::select! {
        result = ctx.onboarding.submit(&target_name, ticker.as_deref()) => result,
        _ = tokio::signal::ctrl_c() => {
            reporter.abort();
            anyhow::bail!("Interrupted while waiting for analysis of {}", target_name);
        }
    };
    reporter.abort();

    let entry = outcome.with_context(|| format!("Onboarding {} failed", target_name))?;
    println!("Added {} ({})", entry.name, entry.ticker);
    print!("{}", render::portfolio(&ctx.portfolio.list().await));
    Ok(())
}
