//! Report rendering.
//!
//! Turns a `Report` into the plain-text summary and the flat per-row
//! records (CSV or JSON). Both are rendered from the same report, so their
//! counts always agree.

use crate::analysis::{average_response_time, keyword_visibility, Report, Row};
use crate::models::{
    AttributeResult, FailureKind, PerformanceResult, ProbeFailure, ProbeKind, RankResult,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Generate the plain-text report.
pub fn generate_text_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("SEO Monitoring Summary Report\n");
    output.push_str("============================\n\n");
    output.push_str(&generate_header_section(report));
    output.push_str(&generate_rankings_section(report));
    output.push_str(&generate_performance_section(report));
    output.push_str(&generate_attributes_section(report));
    output.push_str(&generate_failures_section(report));

    output
}

fn generate_header_section(report: &Report) -> String {
    let mut section = String::new();
    let summary = &report.summary;

    section.push_str(&format!(
        "Generated at: {}\n",
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "Cycle: {} (started {})\n",
        report.cycle,
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "Probes: {} total, {} succeeded, {} failed\n",
        summary.total(),
        summary.succeeded(),
        summary.failed()
    ));
    for (kind, tally) in [
        (ProbeKind::Rank, summary.rank),
        (ProbeKind::Attributes, summary.attributes),
        (ProbeKind::Performance, summary.performance),
    ] {
        section.push_str(&format!(
            "  {}: {} succeeded, {} failed\n",
            kind, tally.succeeded, tally.failed
        ));
    }
    if let Some(visibility) = keyword_visibility(summary) {
        section.push_str(&format!(
            "Keyword visibility: {:.0}%\n",
            visibility * 100.0
        ));
    }
    if let Some(average) = average_response_time(report) {
        section.push_str(&format!("Average response time: {:.2} seconds\n", average));
    }
    section.push('\n');

    section
}

fn generate_rankings_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("Keyword Rankings:\n");
    if report.rankings.iter().all(|t| t.entries.is_empty()) {
        section.push_str("No keywords configured.\n\n");
        return section;
    }

    for target in &report.rankings {
        section.push_str(&format!("\n{}:\n", target.target));
        for entry in &target.entries {
            let cell = match &entry.row {
                Row::Recorded(RankResult {
                    position: Some(p), ..
                }) => format!("Position {}", p),
                Row::Recorded(_) => "Not found".to_string(),
                Row::Unavailable(failure) => unavailable(failure),
            };
            section.push_str(&format!("- {}: {}\n", entry.keyword, cell));
        }
    }
    section.push('\n');

    section
}

fn generate_performance_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("Performance Metrics:\n");
    for row in &report.performance {
        section.push_str(&format!("\n{}:\n", row.target));
        match &row.row {
            Row::Recorded(p) => {
                section.push_str(&format!(
                    "- Response Time: {:.2} seconds\n",
                    p.response_time_seconds
                ));
                section.push_str(&format!("- Status Code: {}\n", p.status_code));
                section.push_str(&format!(
                    "- Content Length: {} bytes\n",
                    p.content_length_bytes
                ));
            }
            Row::Unavailable(failure) => {
                section.push_str(&format!("- {}\n", unavailable(failure)));
            }
        }
    }
    section.push('\n');

    section
}

fn generate_attributes_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("Meta Tags Analysis:\n");
    for row in &report.attributes {
        section.push_str(&format!("\n{}:\n", row.target));
        match &row.row {
            Row::Recorded(a) => {
                section.push_str(&format!(
                    "- Title: {}\n",
                    a.title.as_deref().unwrap_or("(none)")
                ));
                section.push_str(&format!(
                    "- Meta Description: {}\n",
                    a.meta_description.as_deref().unwrap_or("(none)")
                ));
                section.push_str(&format!("- H1 Tags: {}\n", a.h1_count));
                section.push_str(&format!("- H2 Tags: {}\n", a.h2_count));
                section.push_str(&format!("- Missing Alt Tags: {}\n", a.missing_alt_count));
            }
            Row::Unavailable(failure) => {
                section.push_str(&format!("- {}\n", unavailable(failure)));
            }
        }
    }
    section.push('\n');

    section
}

fn generate_failures_section(report: &Report) -> String {
    let failures = report.failures();
    if failures.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str(&format!("Failures ({}):\n", failures.len()));
    for failure in failures {
        let subject = match &failure.keyword {
            Some(keyword) => format!("{} [{}]", failure.target, keyword),
            None => failure.target.clone(),
        };
        section.push_str(&format!(
            "- {} {}: {}\n",
            failure.probe,
            subject,
            failure.reason()
        ));
    }
    section.push('\n');

    section
}

fn unavailable(failure: &ProbeFailure) -> String {
    format!("Unavailable ({})", failure.reason())
}

/// One flat row of the records artifact. Fields that do not apply to the
/// row's probe kind are empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub cycle: u64,
    pub probe: ProbeKind,
    pub target: String,
    pub keyword: Option<String>,
    pub status: &'static str,
    pub position: Option<usize>,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_count: Option<usize>,
    pub h2_count: Option<usize>,
    pub missing_alt_count: Option<usize>,
    pub status_code: Option<u16>,
    pub response_time_seconds: Option<f64>,
    pub content_length_bytes: Option<usize>,
    pub failure_kind: Option<FailureKind>,
    pub failure_detail: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl Record {
    fn blank(
        cycle: u64,
        probe: ProbeKind,
        target: &str,
        keyword: Option<&str>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            cycle,
            probe,
            target: target.to_string(),
            keyword: keyword.map(String::from),
            status: "ok",
            position: None,
            title: None,
            meta_description: None,
            h1_count: None,
            h2_count: None,
            missing_alt_count: None,
            status_code: None,
            response_time_seconds: None,
            content_length_bytes: None,
            failure_kind: None,
            failure_detail: None,
            observed_at,
        }
    }

    fn failed(cycle: u64, failure: &ProbeFailure) -> Self {
        Self {
            status: "unavailable",
            failure_kind: Some(failure.kind),
            failure_detail: Some(failure.detail.clone()),
            ..Self::blank(
                cycle,
                failure.probe,
                &failure.target,
                failure.keyword.as_deref(),
                failure.observed_at,
            )
        }
    }

    fn rank(cycle: u64, r: &RankResult) -> Self {
        Self {
            position: r.position.map(|p| p.get()),
            ..Self::blank(cycle, ProbeKind::Rank, &r.target, Some(&r.keyword), r.observed_at)
        }
    }

    fn attributes(cycle: u64, a: &AttributeResult) -> Self {
        Self {
            title: a.title.clone(),
            meta_description: a.meta_description.clone(),
            h1_count: Some(a.h1_count),
            h2_count: Some(a.h2_count),
            missing_alt_count: Some(a.missing_alt_count),
            ..Self::blank(cycle, ProbeKind::Attributes, &a.target, None, a.observed_at)
        }
    }

    fn performance(cycle: u64, p: &PerformanceResult) -> Self {
        Self {
            status_code: Some(p.status_code),
            response_time_seconds: Some(p.response_time_seconds),
            content_length_bytes: Some(p.content_length_bytes),
            ..Self::blank(cycle, ProbeKind::Performance, &p.target, None, p.observed_at)
        }
    }
}

/// Flatten a report into one record per row, in report order.
pub fn records(report: &Report) -> Vec<Record> {
    let cycle = report.cycle;
    let mut out = Vec::with_capacity(report.row_count());

    for target in &report.rankings {
        for entry in &target.entries {
            out.push(match &entry.row {
                Row::Recorded(r) => Record::rank(cycle, r),
                Row::Unavailable(f) => Record::failed(cycle, f),
            });
        }
    }
    for row in &report.attributes {
        out.push(match &row.row {
            Row::Recorded(a) => Record::attributes(cycle, a),
            Row::Unavailable(f) => Record::failed(cycle, f),
        });
    }
    for row in &report.performance {
        out.push(match &row.row {
            Row::Recorded(p) => Record::performance(cycle, p),
            Row::Unavailable(f) => Record::failed(cycle, f),
        });
    }

    out
}

/// Render the records as CSV with a header row.
pub fn generate_csv_records(report: &Report) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records(report) {
        writer.serialize(&record).context("Failed to serialize record")?;
    }
    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Render the records as a JSON array.
pub fn generate_json_records(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(&records(report)).map_err(Into::into)
}
