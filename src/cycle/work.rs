//! Work-list construction.

use crate::error::CycleError;
use crate::models::{FailureKind, ProbeFailure, ProbeKind, ProbeOutcome};
use crate::probe::Prober;
use std::collections::HashSet;

/// One unit of dispatched probe work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    Rank { target: String, keyword: String },
    Attributes { target: String },
    Performance { target: String },
}

impl WorkItem {
    pub fn probe_kind(&self) -> ProbeKind {
        match self {
            WorkItem::Rank { .. } => ProbeKind::Rank,
            WorkItem::Attributes { .. } => ProbeKind::Attributes,
            WorkItem::Performance { .. } => ProbeKind::Performance,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            WorkItem::Rank { target, .. }
            | WorkItem::Attributes { target }
            | WorkItem::Performance { target } => target,
        }
    }

    pub fn keyword(&self) -> Option<&str> {
        match self {
            WorkItem::Rank { keyword, .. } => Some(keyword),
            _ => None,
        }
    }

    /// Run the probe this item stands for.
    pub async fn run(&self, prober: &dyn Prober) -> ProbeOutcome {
        let result = match self {
            WorkItem::Rank { target, keyword } => prober
                .check_ranking(target, keyword)
                .await
                .map(ProbeOutcome::Rank),
            WorkItem::Attributes { target } => prober
                .analyze_attributes(target)
                .await
                .map(ProbeOutcome::Attributes),
            WorkItem::Performance { target } => prober
                .measure_performance(target)
                .await
                .map(ProbeOutcome::Performance),
        };
        result.unwrap_or_else(ProbeOutcome::Failure)
    }

    /// A failure outcome attributed to this item.
    pub fn failure(&self, kind: FailureKind, detail: impl Into<String>) -> ProbeOutcome {
        ProbeOutcome::Failure(ProbeFailure::new(
            self.probe_kind(),
            self.target(),
            self.keyword(),
            kind,
            detail,
        ))
    }
}

/// Build the full work list for one cycle: every target × keyword rank
/// check, then one attribute and one performance item per target.
pub fn build_work_list(targets: &[String], keywords: &[String]) -> Result<Vec<WorkItem>, CycleError> {
    if targets.is_empty() {
        return Err(CycleError::NoTargets);
    }
    check_unique("target", targets)?;
    check_unique("keyword", keywords)?;

    let mut items = Vec::with_capacity(targets.len() * (keywords.len() + 2));

    for target in targets {
        for keyword in keywords {
            items.push(WorkItem::Rank {
                target: target.clone(),
                keyword: keyword.clone(),
            });
        }
    }

    for target in targets {
        items.push(WorkItem::Attributes {
            target: target.clone(),
        });
        items.push(WorkItem::Performance {
            target: target.clone(),
        });
    }

    Ok(items)
}

fn check_unique(kind: &'static str, values: &[String]) -> Result<(), CycleError> {
    let mut seen = HashSet::new();
    for value in values {
        if value.trim().is_empty() {
            return Err(CycleError::Blank(kind));
        }
        if !seen.insert(value.as_str()) {
            return Err(CycleError::Duplicate {
                kind,
                value: value.clone(),
            });
        }
    }
    Ok(())
}
