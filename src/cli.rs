//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::{RecordsFormat, DEFAULT_CONFIG_FILE};
use clap::Parser;
use std::path::PathBuf;

/// SEO Monitor - scheduled keyword ranking, on-page and performance checks
///
/// Probes a fixed set of websites every cycle and writes a timestamped
/// record file plus a grouped text report.
///
/// Examples:
///   seo-monitor --config seo-monitor.toml
///   seo-monitor --once --output-dir reports
///   seo-monitor --max-concurrency 10 --interval 900
///   seo-monitor --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_FILE,
        env = "SEO_MONITOR_CONFIG"
    )]
    pub config: PathBuf,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Directory for report artifacts (overrides config)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum probes in flight (overrides config)
    #[arg(long, value_name = "NUM")]
    pub max_concurrency: Option<usize>,

    /// Seconds between cycles (overrides config)
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Format of the raw record file (csv, json)
    #[arg(long, value_name = "FORMAT")]
    pub records_format: Option<RecordsFormat>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.max_concurrency == Some(0) {
            return Err("Max concurrency must be at least 1".to_string());
        }

        if self.interval == Some(0) {
            return Err("Interval must be at least 1 second".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref dir) = self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Output path is not a directory: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
            once: false,
            output_dir: None,
            max_concurrency: None,
            interval: None,
            timeout: None,
            records_format: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "seo-monitor",
            "--once",
            "--max-concurrency",
            "8",
            "--records-format",
            "json",
        ])
        .unwrap();
        assert!(args.once);
        assert_eq!(args.max_concurrency, Some(8));
        assert_eq!(args.records_format, Some(RecordsFormat::Json));
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.max_concurrency = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.interval = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_merge_overrides_config() {
        let mut args = make_args();
        args.max_concurrency = Some(2);
        args.output_dir = Some(PathBuf::from("out"));

        let mut config = crate::config::Config::default();
        config.merge_with_args(&args);
        assert_eq!(config.probe.max_concurrency, 2);
        assert_eq!(config.report.output_dir, PathBuf::from("out"));
        assert_eq!(config.cycle_interval_seconds, 3600);
    }
}
