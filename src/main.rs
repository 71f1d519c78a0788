//! SEO Monitor - scheduled keyword ranking, on-page and response-time checks
//!
//! Runs a monitoring cycle immediately and then on a fixed interval. Each
//! cycle probes every configured target concurrently and writes a flat
//! records file plus a plain-text summary report.
//!
//! Exit codes:
//!   0 - Success (single cycle finished, or stopped with Ctrl-C)
//!   1 - Fatal error (invalid arguments or configuration)

mod analysis;
mod cli;
mod config;
mod cycle;
mod error;
mod extract;
mod fetch;
mod models;
mod probe;
mod report;
mod scheduler;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use cycle::Orchestrator;
use error::ConfigError;
use extract::HtmlExtractor;
use fetch::HttpFetcher;
use probe::{SearchEngine, SeoProber};
use scheduler::Scheduler;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, info_span};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config(&args.config);
    }

    // Initialize logging
    init_logging(&args);

    info!("SEO Monitor v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_monitor(args).await {
        Ok(cycles) => {
            info!("Monitor stopped after {} cycle(s)", cycles);
            Ok(())
        }
        Err(e) => {
            error!("Monitor failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: write a default configuration file.
fn handle_init_config(path: &Path) -> Result<()> {
    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            path.display()
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Created {} with default settings.", path.display());
    println!("   Edit it to set your targets, keywords and cycle interval.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration, wire the probes and run the scheduler. Returns the
/// number of completed cycles.
async fn run_monitor(args: Args) -> Result<u64> {
    let config = load_config(&args)?;

    println!("🔎 Monitoring {} target(s)", config.targets.len());
    println!("   Keywords: {}", config.keywords.len());
    println!("   Interval: {}s", config.cycle_interval_seconds);
    println!("   Concurrency: {}", config.probe.max_concurrency);
    println!("   Output: {}", config.report.output_dir.display());

    let fetcher = HttpFetcher::new(&config.probe.user_agent, config.probe.timeout_seconds)
        .context("Failed to build HTTP client")?;
    let extractor = HtmlExtractor::new(&config.probe.result_selector)
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    let search = SearchEngine::new(&config.probe.search_url, &config.probe.search_query_param)
        .map_err(|e| ConfigError::Invalid(format!("probe.search_url: {}", e)))?;

    let prober = SeoProber::new(Arc::new(fetcher), Arc::new(extractor), search);

    let orchestrator = Orchestrator::new(Arc::new(prober), config.probe.max_concurrency)?
        .with_progress(!args.quiet)
        .in_span(info_span!("run"));

    let scheduler = Scheduler::new(orchestrator, &config)
        .once(args.once)
        .quiet(args.quiet);

    scheduler.run().await
}

/// Load the configuration file and apply CLI overrides.
fn load_config(args: &Args) -> Result<Config, ConfigError> {
    info!("Loading config from: {}", args.config.display());

    let mut config = Config::load(&args.config)?;
    config.merge_with_args(args);
    config.validate()?;

    debug!("Effective config: {:?}", config);
    Ok(config)
}
