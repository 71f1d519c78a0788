//! Configuration file handling.
//!
//! This module handles loading, validating and merging configuration from
//! `seo-monitor.toml` (or a `.json` document with the same shape).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "seo-monitor.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Websites to monitor (domains or URLs).
    pub targets: Vec<String>,

    /// Search terms checked against every target.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Seconds between the start of two cycles.
    #[serde(default = "default_interval")]
    pub cycle_interval_seconds: u64,

    /// Probe settings.
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: vec!["example.com".to_string()],
            keywords: vec!["example domain".to_string()],
            cycle_interval_seconds: default_interval(),
            probe: ProbeConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

fn default_interval() -> u64 {
    3600
}

/// Settings shared by all probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Maximum number of probes in flight at once.
    #[serde(default = "default_concurrency")]
    pub max_concurrency: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Search endpoint used for rank checks.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Query parameter carrying the keyword.
    #[serde(default = "default_query_param")]
    pub search_query_param: String,

    /// CSS selector matching one organic result entry on the search page.
    #[serde(default = "default_result_selector")]
    pub result_selector: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_concurrency(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            search_url: default_search_url(),
            search_query_param: default_query_param(),
            result_selector: default_result_selector(),
        }
    }
}

fn default_concurrency() -> usize {
    5
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_search_url() -> String {
    "https://www.google.com/search".to_string()
}

fn default_query_param() -> String {
    "q".to_string()
}

fn default_result_selector() -> String {
    "div.g".to_string()
}

/// Format of the flat record dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecordsFormat {
    /// Comma-separated values (default)
    #[default]
    Csv,
    /// JSON array of records
    Json,
}

impl RecordsFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RecordsFormat::Csv => "csv",
            RecordsFormat::Json => "json",
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory the per-cycle artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Format of the raw record file.
    #[serde(default)]
    pub records_format: RecordsFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            records_format: RecordsFormat::Csv,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load and validate configuration from a file path.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
        .map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        config.validate()?;
        Ok(config)
    }

    fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    /// Check the invariants the cycle relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::Invalid("at least one target is required".into()));
        }
        check_entries("target", &self.targets)?;
        check_entries("keyword", &self.keywords)?;

        if self.cycle_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "cycle_interval_seconds must be at least 1".into(),
            ));
        }
        if self.probe.max_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "probe.max_concurrency must be at least 1".into(),
            ));
        }
        if self.probe.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "probe.timeout_seconds must be at least 1".into(),
            ));
        }
        if url::Url::parse(&self.probe.search_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "probe.search_url is not a valid URL: {}",
                self.probe.search_url
            )));
        }
        if self.probe.result_selector.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "probe.result_selector must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence; only explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(concurrency) = args.max_concurrency {
            self.probe.max_concurrency = concurrency;
        }
        if let Some(interval) = args.interval {
            self.cycle_interval_seconds = interval;
        }
        if let Some(timeout) = args.timeout {
            self.probe.timeout_seconds = timeout;
        }
        if let Some(ref dir) = args.output_dir {
            self.report.output_dir = dir.clone();
        }
        if let Some(format) = args.records_format {
            self.report.records_format = format;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

fn check_entries(kind: &'static str, entries: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for entry in entries {
        if entry.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("blank {} entry", kind)));
        }
        if !seen.insert(entry.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "duplicate {} `{}`",
                kind, entry
            )));
        }
    }
    Ok(())
}
