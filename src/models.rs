//! Data models for the SEO monitor.
//!
//! Every probe produces exactly one `ProbeOutcome`: one of the three typed
//! results, or a `ProbeFailure` describing why the probe could not complete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// Which probe produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// Keyword ranking lookup
    Rank,
    /// On-page attribute analysis
    Attributes,
    /// Response time / size sample
    Performance,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeKind::Rank => write!(f, "rank"),
            ProbeKind::Attributes => write!(f, "attributes"),
            ProbeKind::Performance => write!(f, "performance"),
        }
    }
}

/// Why a probe could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection or transport failure
    Network,
    /// The request exceeded the configured timeout
    Timeout,
    /// The server answered with a non-success status
    HttpStatus,
    /// The page could not be interpreted
    Parse,
    /// The probe task itself failed (panic, cancelled)
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus => write!(f, "http_status"),
            FailureKind::Parse => write!(f, "parse"),
            FailureKind::Internal => write!(f, "internal"),
        }
    }
}

/// Search position of a target for one keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankResult {
    pub target: String,
    pub keyword: String,
    /// 1-based position; `None` when the target is not in the result listing.
    pub position: Option<NonZeroUsize>,
    pub observed_at: DateTime<Utc>,
}

/// On-page SEO attributes of a target's landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeResult {
    pub target: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_count: usize,
    pub h2_count: usize,
    /// Images with a missing or empty `alt` attribute.
    pub missing_alt_count: usize,
    pub observed_at: DateTime<Utc>,
}

/// One timed fetch of a target's landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResult {
    pub target: String,
    /// Recorded as data: a 500 is still a successful sample.
    pub status_code: u16,
    pub response_time_seconds: f64,
    pub content_length_bytes: usize,
    pub observed_at: DateTime<Utc>,
}

/// A probe that could not produce a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeFailure {
    pub probe: ProbeKind,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    pub kind: FailureKind,
    pub detail: String,
    pub observed_at: DateTime<Utc>,
}

impl ProbeFailure {
    pub fn new(
        probe: ProbeKind,
        target: &str,
        keyword: Option<&str>,
        kind: FailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            probe,
            target: target.to_string(),
            keyword: keyword.map(String::from),
            kind,
            detail: detail.into(),
            observed_at: Utc::now(),
        }
    }

    /// Short form used in reports and logs, e.g. `timeout: request timed out after 30s`.
    pub fn reason(&self) -> String {
        format!("{}: {}", self.kind, self.detail)
    }
}

/// The outcome of a single work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ProbeOutcome {
    Rank(RankResult),
    Attributes(AttributeResult),
    Performance(PerformanceResult),
    Failure(ProbeFailure),
}

impl ProbeOutcome {
    /// The probe that produced this outcome.
    pub fn probe_kind(&self) -> ProbeKind {
        match self {
            ProbeOutcome::Rank(_) => ProbeKind::Rank,
            ProbeOutcome::Attributes(_) => ProbeKind::Attributes,
            ProbeOutcome::Performance(_) => ProbeKind::Performance,
            ProbeOutcome::Failure(f) => f.probe,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            ProbeOutcome::Rank(r) => &r.target,
            ProbeOutcome::Attributes(a) => &a.target,
            ProbeOutcome::Performance(p) => &p.target,
            ProbeOutcome::Failure(f) => &f.target,
        }
    }

    pub fn keyword(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Rank(r) => Some(&r.keyword),
            ProbeOutcome::Failure(f) => f.keyword.as_deref(),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ProbeOutcome::Failure(_))
    }
}

/// URL to fetch for a target. Bare domains are fetched over HTTPS.
pub fn page_url(target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("https://{}", target)
    }
}

/// The string searched for inside result entries: the target without
/// scheme or trailing slash.
pub fn match_key(target: &str) -> &str {
    target
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(probe: ProbeKind, keyword: Option<&str>) -> ProbeFailure {
        ProbeFailure::new(
            probe,
            "example.com",
            keyword,
            FailureKind::Network,
            "connection refused",
        )
    }

    #[test]
    fn test_outcome_accessors() {
        let rank = ProbeOutcome::Rank(RankResult {
            target: "example.com".to_string(),
            keyword: "widget".to_string(),
            position: NonZeroUsize::new(3),
            observed_at: Utc::now(),
        });
        assert_eq!(rank.probe_kind(), ProbeKind::Rank);
        assert_eq!(rank.target(), "example.com");
        assert_eq!(rank.keyword(), Some("widget"));
        assert!(!rank.is_failure());

        let failed = ProbeOutcome::Failure(failure(ProbeKind::Performance, None));
        assert_eq!(failed.probe_kind(), ProbeKind::Performance);
        assert_eq!(failed.keyword(), None);
        assert!(failed.is_failure());
    }

    #[test]
    fn test_failure_reason() {
        let f = failure(ProbeKind::Rank, Some("widget"));
        assert_eq!(f.reason(), "network: connection refused");
        assert_eq!(f.keyword.as_deref(), Some("widget"));
    }

    #[test]
    fn test_page_url() {
        assert_eq!(page_url("example.com"), "https://example.com");
        assert_eq!(page_url("http://example.com/a"), "http://example.com/a");
        assert_eq!(page_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_match_key() {
        assert_eq!(match_key("https://example.com/"), "example.com");
        assert_eq!(match_key("http://example.com/blog"), "example.com/blog");
        assert_eq!(match_key("example.com"), "example.com");
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = ProbeOutcome::Failure(failure(ProbeKind::Attributes, None));
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"outcome\":\"failure\""));
        assert!(json.contains("\"probe\":\"attributes\""));
        assert!(!json.contains("keyword"));
    }
}
