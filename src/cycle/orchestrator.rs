//! Cycle orchestrator.
//!
//! Dispatches every work item of a cycle first, then joins on the full set.
//! A semaphore caps the number of probes in flight; a failing or panicking
//! probe only ever affects its own slot in the batch.

use super::batch::{CycleBatch, OpenBatch};
use super::work::{build_work_list, WorkItem};
use crate::error::CycleError;
use crate::models::{FailureKind, ProbeKind, ProbeOutcome};
use crate::probe::Prober;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

/// Runs monitoring cycles against a prober.
pub struct Orchestrator {
    prober: Arc<dyn Prober>,
    max_concurrency: usize,
    show_progress: bool,
    span: Span,
}

impl Orchestrator {
    pub fn new(prober: Arc<dyn Prober>, max_concurrency: usize) -> Result<Self, CycleError> {
        if max_concurrency == 0 {
            return Err(CycleError::ZeroConcurrency);
        }

        Ok(Self {
            prober,
            max_concurrency,
            show_progress: false,
            span: Span::none(),
        })
    }

    /// Show a progress bar over work items while a cycle runs.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Parent span for every cycle span and probe task.
    pub fn in_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Run one cycle and return its closed batch.
    ///
    /// Fails only when the work list cannot be built; individual probe
    /// problems end up as failure outcomes inside the batch.
    pub async fn run_cycle(
        &self,
        cycle: u64,
        targets: &[String],
        keywords: &[String],
    ) -> Result<CycleBatch, CycleError> {
        let work = build_work_list(targets, keywords)?;
        let span = info_span!(parent: &self.span, "cycle", cycle);
        let batch = OpenBatch::new(cycle, targets, keywords, work.len());

        Ok(self
            .dispatch(work, batch, span.clone())
            .instrument(span)
            .await)
    }

    async fn dispatch(&self, work: Vec<WorkItem>, mut batch: OpenBatch, span: Span) -> CycleBatch {
        let total = work.len();
        info!(
            "Starting monitoring cycle: {} work items, at most {} in flight",
            total, self.max_concurrency
        );

        let limiter = Arc::new(Semaphore::new(self.max_concurrency));
        let progress = self.progress_bar(total);

        let (items, handles): (Vec<_>, Vec<_>) = work
            .into_iter()
            .map(|item| {
                let prober = Arc::clone(&self.prober);
                let limiter = Arc::clone(&limiter);
                let progress = progress.clone();
                let task_item = item.clone();

                let handle = tokio::spawn(
                    async move {
                        let outcome = match limiter.acquire_owned().await {
                            Ok(_permit) => task_item.run(prober.as_ref()).await,
                            Err(_) => task_item
                                .failure(FailureKind::Internal, "concurrency limiter closed"),
                        };
                        progress.inc(1);
                        outcome
                    }
                    .instrument(span.clone()),
                );

                (item, handle)
            })
            .unzip();

        let joined = futures::future::join_all(handles).await;

        for (item, result) in items.into_iter().zip(joined) {
            let outcome = result.unwrap_or_else(|e| {
                error!(
                    "{} probe task for {} did not complete: {}",
                    item.probe_kind(),
                    item.target(),
                    e
                );
                item.failure(FailureKind::Internal, format!("probe task failed: {}", e))
            });

            if let ProbeOutcome::Failure(ref failure) = outcome {
                match failure.keyword {
                    Some(ref keyword) => warn!(
                        "{} probe failed for {} / {}: {}",
                        failure.probe,
                        failure.target,
                        keyword,
                        failure.reason()
                    ),
                    None => warn!(
                        "{} probe failed for {}: {}",
                        failure.probe,
                        failure.target,
                        failure.reason()
                    ),
                }
            }

            batch.record(outcome);
        }

        progress.finish_and_clear();
        debug_assert_eq!(batch.len(), total);

        let batch = batch.close();
        info!(
            "Monitoring cycle completed: {} outcomes, {} failed, {:.1}s",
            batch.outcomes().len(),
            batch.failure_count(),
            batch.duration_seconds()
        );
        debug!(
            "Outcomes by probe: rank={} attributes={} performance={}",
            batch.count_for(ProbeKind::Rank),
            batch.count_for(ProbeKind::Attributes),
            batch.count_for(ProbeKind::Performance)
        );

        batch
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} probes")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}
