//! Cycle scheduling.
//!
//! Runs the first cycle immediately, then one every `cycle_interval_seconds`
//! until shutdown is requested. Each cycle is aggregated and persisted
//! before the next tick is awaited.

use crate::analysis::build_report;
use crate::config::{Config, RecordsFormat};
use crate::cycle::Orchestrator;
use crate::report::{write_artifacts, ArtifactPaths};
use anyhow::{Context, Result};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// What one finished cycle produced.
#[derive(Debug, Clone)]
pub struct CycleSummary {
    pub cycle: u64,
    pub work_items: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub duration_seconds: f64,
    /// `None` when the artifacts could not be written.
    pub artifacts: Option<ArtifactPaths>,
}

impl CycleSummary {
    pub fn line(&self) -> String {
        let saved = match &self.artifacts {
            Some(paths) => format!(
                "saved to {} and {}",
                paths.records.display(),
                paths.report.display()
            ),
            None => "artifacts not written".to_string(),
        };
        format!(
            "Cycle {}: {} probes, {} succeeded, {} failed in {:.1}s; {}",
            self.cycle, self.work_items, self.succeeded, self.failed, self.duration_seconds, saved
        )
    }
}

/// Drives the orchestrator on a fixed interval.
pub struct Scheduler {
    orchestrator: Orchestrator,
    targets: Vec<String>,
    keywords: Vec<String>,
    interval: Duration,
    output_dir: PathBuf,
    records_format: RecordsFormat,
    once: bool,
    quiet: bool,
}

impl Scheduler {
    pub fn new(orchestrator: Orchestrator, config: &Config) -> Self {
        Self {
            orchestrator,
            targets: config.targets.clone(),
            keywords: config.keywords.clone(),
            interval: Duration::from_secs(config.cycle_interval_seconds),
            output_dir: config.report.output_dir.clone(),
            records_format: config.report.records_format,
            once: false,
            quiet: false,
        }
    }

    /// Stop after the first cycle.
    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    /// Suppress the per-cycle summary line on stdout.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Run until Ctrl-C (or after one cycle in `once` mode).
    pub async fn run(&self) -> Result<u64> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
        })
        .await
    }

    /// Run until `shutdown` resolves. Returns the number of completed cycles.
    ///
    /// A cycle in progress when shutdown arrives is abandoned and not
    /// persisted.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<u64>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut completed = 0u64;

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let cycle = completed + 1;
            let summary = tokio::select! {
                _ = &mut shutdown => {
                    warn!("Cycle {} interrupted before completion", cycle);
                    break;
                }
                summary = self.run_cycle(cycle) => summary?,
            };

            completed = cycle;
            if !self.quiet {
                println!("📊 {}", summary.line());
            }

            if self.once {
                break;
            }
            info!("Next cycle in {}s", self.interval.as_secs());
        }

        Ok(completed)
    }

    /// Run, aggregate and persist a single cycle.
    async fn run_cycle(&self, cycle: u64) -> Result<CycleSummary> {
        let batch = self
            .orchestrator
            .run_cycle(cycle, &self.targets, &self.keywords)
            .await
            .with_context(|| format!("Cycle {} could not start", cycle))?;

        let report = build_report(&batch);

        let artifacts = match write_artifacts(
            &report,
            &self.output_dir,
            self.records_format,
            batch.finished_at(),
        ) {
            Ok(paths) => {
                info!("Cycle {} results saved to {}", cycle, paths.records.display());
                Some(paths)
            }
            Err(e) => {
                warn!("Failed to persist cycle {}: {:#}", cycle, e);
                None
            }
        };

        Ok(CycleSummary {
            cycle,
            work_items: report.row_count(),
            succeeded: report.summary.succeeded(),
            failed: report.summary.failed(),
            duration_seconds: batch.duration_seconds(),
            artifacts,
        })
    }
}
