//! Cycle batch lifecycle: open while probes complete, closed afterwards.

use crate::models::{ProbeKind, ProbeOutcome};
use chrono::{DateTime, Utc};

/// A batch that is still being filled.
#[derive(Debug)]
pub struct OpenBatch {
    cycle: u64,
    started_at: DateTime<Utc>,
    targets: Vec<String>,
    keywords: Vec<String>,
    outcomes: Vec<ProbeOutcome>,
}

impl OpenBatch {
    pub fn new(cycle: u64, targets: &[String], keywords: &[String], capacity: usize) -> Self {
        Self {
            cycle,
            started_at: Utc::now(),
            targets: targets.to_vec(),
            keywords: keywords.to_vec(),
            outcomes: Vec::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, outcome: ProbeOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Seal the batch. No outcome can be added afterwards.
    pub fn close(self) -> CycleBatch {
        CycleBatch {
            cycle: self.cycle,
            started_at: self.started_at,
            finished_at: Utc::now(),
            targets: self.targets,
            keywords: self.keywords,
            outcomes: self.outcomes,
        }
    }
}

/// All outcomes of one cycle, plus the configuration they were produced for.
#[derive(Debug, Clone)]
pub struct CycleBatch {
    cycle: u64,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    targets: Vec<String>,
    keywords: Vec<String>,
    outcomes: Vec<ProbeOutcome>,
}

impl CycleBatch {
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Targets in configured order.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Keywords in configured order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn outcomes(&self) -> &[ProbeOutcome] {
        &self.outcomes
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn count_for(&self, kind: ProbeKind) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.probe_kind() == kind)
            .count()
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureKind, PerformanceResult, ProbeFailure};

    #[test]
    fn test_open_then_close() {
        let targets = vec!["a.com".to_string()];
        let mut open = OpenBatch::new(7, &targets, &[], 2);
        assert_eq!(open.len(), 0);

        open.record(ProbeOutcome::Performance(PerformanceResult {
            target: "a.com".to_string(),
            status_code: 200,
            response_time_seconds: 0.2,
            content_length_bytes: 10,
            observed_at: Utc::now(),
        }));
        open.record(ProbeOutcome::Failure(ProbeFailure::new(
            ProbeKind::Attributes,
            "a.com",
            None,
            FailureKind::Network,
            "refused",
        )));

        let batch = open.close();
        assert_eq!(batch.cycle(), 7);
        assert_eq!(batch.outcomes().len(), 2);
        assert_eq!(batch.failure_count(), 1);
        assert_eq!(batch.count_for(ProbeKind::Attributes), 1);
        assert_eq!(batch.count_for(ProbeKind::Rank), 0);
        assert!(batch.finished_at() >= batch.started_at());
        assert!(batch.duration_seconds() >= 0.0);
    }
}
