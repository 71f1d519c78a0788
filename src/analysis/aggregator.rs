//! Outcome aggregation.
//!
//! Folds a closed cycle batch into a `Report`: rankings grouped per target
//! in configured keyword order, one performance and one attribute row per
//! target. Failures stay in place as `Row::Unavailable`, so every configured
//! work item has exactly one row.

use crate::cycle::CycleBatch;
use crate::models::{
    AttributeResult, FailureKind, PerformanceResult, ProbeFailure, ProbeKind, ProbeOutcome,
    RankResult,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One report cell: the recorded value, or why it is missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Row<T> {
    Recorded(T),
    Unavailable(ProbeFailure),
}

impl<T> Row<T> {
    pub fn recorded(&self) -> Option<&T> {
        match self {
            Row::Recorded(value) => Some(value),
            Row::Unavailable(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ProbeFailure> {
        match self {
            Row::Recorded(_) => None,
            Row::Unavailable(failure) => Some(failure),
        }
    }
}

/// Keyword rankings of one target, in configured keyword order.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRankings {
    pub target: String,
    pub entries: Vec<KeywordRank>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRank {
    pub keyword: String,
    pub row: Row<RankResult>,
}

/// A single per-target row.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRow<T> {
    pub target: String,
    pub row: Row<T>,
}

/// Success/failure counts for one probe kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl ProbeTally {
    fn count<T>(&mut self, row: &Row<T>) {
        match row {
            Row::Recorded(_) => self.succeeded += 1,
            Row::Unavailable(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Counts shared by every artifact rendered from a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub rank: ProbeTally,
    pub attributes: ProbeTally,
    pub performance: ProbeTally,
    /// Rank rows whose target was found in the results.
    pub keywords_found: usize,
}

impl ReportSummary {
    pub fn total(&self) -> usize {
        self.rank.total() + self.attributes.total() + self.performance.total()
    }

    pub fn succeeded(&self) -> usize {
        self.rank.succeeded + self.attributes.succeeded + self.performance.succeeded
    }

    pub fn failed(&self) -> usize {
        self.rank.failed + self.attributes.failed + self.performance.failed
    }
}

/// Read-only view over one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rankings: Vec<TargetRankings>,
    pub performance: Vec<TargetRow<PerformanceResult>>,
    pub attributes: Vec<TargetRow<AttributeResult>>,
    pub summary: ReportSummary,
}

impl Report {
    /// Every failure in the report, in row order.
    pub fn failures(&self) -> Vec<&ProbeFailure> {
        let ranks = self
            .rankings
            .iter()
            .flat_map(|t| t.entries.iter().filter_map(|e| e.row.failure()));
        let perf = self.performance.iter().filter_map(|r| r.row.failure());
        let attrs = self.attributes.iter().filter_map(|r| r.row.failure());

        ranks.chain(perf).chain(attrs).collect()
    }

    /// Number of rows; equals the number of configured work items.
    pub fn row_count(&self) -> usize {
        self.summary.total()
    }
}

type OutcomeKey<'a> = (ProbeKind, &'a str, Option<&'a str>);

/// Build the report for a closed batch. Pure: the same batch always yields
/// the same report.
pub fn build_report(batch: &CycleBatch) -> Report {
    let mut index: HashMap<OutcomeKey<'_>, &ProbeOutcome> = HashMap::new();
    for outcome in batch.outcomes() {
        index
            .entry((outcome.probe_kind(), outcome.target(), outcome.keyword()))
            .or_insert(outcome);
    }

    let missing = |probe: ProbeKind, target: &str, keyword: Option<&str>| ProbeFailure {
        probe,
        target: target.to_string(),
        keyword: keyword.map(String::from),
        kind: FailureKind::Internal,
        detail: "no outcome recorded".to_string(),
        observed_at: batch.finished_at(),
    };

    let mut summary = ReportSummary::default();

    let rankings: Vec<TargetRankings> = batch
        .targets()
        .iter()
        .map(|target| {
            let entries = batch
                .keywords()
                .iter()
                .map(|keyword| {
                    let key = (ProbeKind::Rank, target.as_str(), Some(keyword.as_str()));
                    let row = match index.get(&key) {
                        Some(ProbeOutcome::Rank(r)) => Row::Recorded(r.clone()),
                        Some(ProbeOutcome::Failure(f)) => Row::Unavailable(f.clone()),
                        _ => Row::Unavailable(missing(ProbeKind::Rank, target, Some(keyword))),
                    };
                    summary.rank.count(&row);
                    if matches!(row, Row::Recorded(RankResult { position: Some(_), .. })) {
                        summary.keywords_found += 1;
                    }
                    KeywordRank {
                        keyword: keyword.clone(),
                        row,
                    }
                })
                .collect();

            TargetRankings {
                target: target.clone(),
                entries,
            }
        })
        .collect();

    let performance: Vec<TargetRow<PerformanceResult>> = batch
        .targets()
        .iter()
        .map(|target| {
            let row = match index.get(&(ProbeKind::Performance, target.as_str(), None)) {
                Some(ProbeOutcome::Performance(p)) => Row::Recorded(p.clone()),
                Some(ProbeOutcome::Failure(f)) => Row::Unavailable(f.clone()),
                _ => Row::Unavailable(missing(ProbeKind::Performance, target, None)),
            };
            summary.performance.count(&row);
            TargetRow {
                target: target.clone(),
                row,
            }
        })
        .collect();

    let attributes: Vec<TargetRow<AttributeResult>> = batch
        .targets()
        .iter()
        .map(|target| {
            let row = match index.get(&(ProbeKind::Attributes, target.as_str(), None)) {
                Some(ProbeOutcome::Attributes(a)) => Row::Recorded(a.clone()),
                Some(ProbeOutcome::Failure(f)) => Row::Unavailable(f.clone()),
                _ => Row::Unavailable(missing(ProbeKind::Attributes, target, None)),
            };
            summary.attributes.count(&row);
            TargetRow {
                target: target.clone(),
                row,
            }
        })
        .collect();

    Report {
        cycle: batch.cycle(),
        started_at: batch.started_at(),
        finished_at: batch.finished_at(),
        rankings,
        performance,
        attributes,
        summary,
    }
}

/// Mean response time over recorded performance rows; failures are excluded.
pub fn average_response_time(report: &Report) -> Option<f64> {
    let times: Vec<f64> = report
        .performance
        .iter()
        .filter_map(|r| r.row.recorded())
        .map(|p| p.response_time_seconds)
        .collect();

    if times.is_empty() {
        None
    } else {
        Some(times.iter().sum::<f64>() / times.len() as f64)
    }
}

/// Share of rank checks where the target appeared, over successful checks only.
pub fn keyword_visibility(summary: &ReportSummary) -> Option<f64> {
    if summary.rank.succeeded == 0 {
        None
    } else {
        Some(summary.keywords_found as f64 / summary.rank.succeeded as f64)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cycle::OpenBatch;
    use std::num::NonZeroUsize;

    pub(crate) fn rank(target: &str, keyword: &str, position: usize) -> ProbeOutcome {
        ProbeOutcome::Rank(RankResult {
            target: target.to_string(),
            keyword: keyword.to_string(),
            position: NonZeroUsize::new(position),
            observed_at: Utc::now(),
        })
    }

    pub(crate) fn perf(target: &str, seconds: f64) -> ProbeOutcome {
        ProbeOutcome::Performance(PerformanceResult {
            target: target.to_string(),
            status_code: 200,
            response_time_seconds: seconds,
            content_length_bytes: 2048,
            observed_at: Utc::now(),
        })
    }

    pub(crate) fn attrs(target: &str) -> ProbeOutcome {
        ProbeOutcome::Attributes(AttributeResult {
            target: target.to_string(),
            title: Some("Example".to_string()),
            meta_description: None,
            h1_count: 2,
            h2_count: 1,
            missing_alt_count: 1,
            observed_at: Utc::now(),
        })
    }

    pub(crate) fn failed(probe: ProbeKind, target: &str, keyword: Option<&str>) -> ProbeOutcome {
        ProbeOutcome::Failure(ProbeFailure::new(
            probe,
            target,
            keyword,
            FailureKind::Network,
            "connection refused",
        ))
    }

    /// Two targets, two keywords; b.com's performance probe and one of its
    /// rank checks failed. Outcomes are recorded out of order.
    pub(crate) fn sample_batch() -> CycleBatch {
        let targets = vec!["a.com".to_string(), "b.com".to_string()];
        let keywords = vec!["widget".to_string(), "gadget".to_string()];
        let mut open = OpenBatch::new(4, &targets, &keywords, 8);

        for outcome in [
            perf("a.com", 0.5),
            rank("b.com", "gadget", 7),
            rank("a.com", "gadget", 0),
            failed(ProbeKind::Performance, "b.com", None),
            attrs("b.com"),
            rank("a.com", "widget", 2),
            failed(ProbeKind::Rank, "b.com", Some("widget")),
            attrs("a.com"),
        ] {
            open.record(outcome);
        }

        open.close()
    }

    #[test]
    fn test_rankings_in_configured_order() {
        let report = build_report(&sample_batch());

        assert_eq!(report.rankings.len(), 2);
        let a = &report.rankings[0];
        assert_eq!(a.target, "a.com");
        let keywords: Vec<_> = a.entries.iter().map(|e| e.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["widget", "gadget"]);
        assert_eq!(
            a.entries[0].row.recorded().and_then(|r| r.position),
            NonZeroUsize::new(2)
        );
        assert_eq!(a.entries[1].row.recorded().map(|r| r.position), Some(None));

        let b = &report.rankings[1];
        assert!(b.entries[0].row.failure().is_some());
        assert!(b.entries[1].row.recorded().is_some());
    }

    #[test]
    fn test_failed_target_still_listed() {
        let report = build_report(&sample_batch());

        assert_eq!(report.performance.len(), 2);
        assert_eq!(report.performance[1].target, "b.com");
        let failure = report.performance[1].row.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Network);
    }

    #[test]
    fn test_summary_counts() {
        let report = build_report(&sample_batch());
        let summary = report.summary;

        assert_eq!(summary.rank, ProbeTally { succeeded: 3, failed: 1 });
        assert_eq!(summary.performance, ProbeTally { succeeded: 1, failed: 1 });
        assert_eq!(summary.attributes, ProbeTally { succeeded: 2, failed: 0 });
        assert_eq!(summary.keywords_found, 2);
        assert_eq!(summary.total(), 8);
        assert_eq!(report.row_count(), 8);
        assert_eq!(report.failures().len(), 2);
    }

    #[test]
    fn test_build_report_is_idempotent() {
        let batch = sample_batch();
        assert_eq!(build_report(&batch), build_report(&batch));
    }

    #[test]
    fn test_missing_outcome_is_unavailable() {
        let targets = vec!["a.com".to_string()];
        let keywords = vec!["widget".to_string()];
        let mut open = OpenBatch::new(1, &targets, &keywords, 1);
        open.record(perf("a.com", 0.1));
        let batch = open.close();

        let report = build_report(&batch);
        assert_eq!(report.row_count(), 3);
        assert_eq!(report.summary.failed(), 2);
        let failure = report.attributes[0].row.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Internal);
        assert_eq!(failure.observed_at, batch.finished_at());
    }

    #[test]
    fn test_failure_only_cycle() {
        let targets = vec!["down.com".to_string()];
        let mut open = OpenBatch::new(1, &targets, &[], 2);
        open.record(failed(ProbeKind::Attributes, "down.com", None));
        open.record(failed(ProbeKind::Performance, "down.com", None));

        let report = build_report(&open.close());
        assert_eq!(report.summary.succeeded(), 0);
        assert_eq!(report.summary.failed(), 2);
        assert_eq!(average_response_time(&report), None);
        assert_eq!(keyword_visibility(&report.summary), None);
    }

    #[test]
    fn test_aggregates_exclude_failures() {
        let report = build_report(&sample_batch());

        assert_eq!(average_response_time(&report), Some(0.5));
        let visibility = keyword_visibility(&report.summary).unwrap();
        assert!((visibility - 2.0 / 3.0).abs() < 1e-9);
    }
}
