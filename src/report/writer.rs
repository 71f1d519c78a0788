//! Artifact persistence.

use super::generator::{generate_csv_records, generate_json_records, generate_text_report};
use crate::analysis::Report;
use crate::config::RecordsFormat;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files written for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub records: PathBuf,
    pub report: PathBuf,
}

/// Suffix shared by both artifacts of one cycle, e.g. `20240501_093000`.
pub fn artifact_stamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y%m%d_%H%M%S").to_string()
}

/// Write the records file and the text report for `report` into `dir`.
///
/// Existing files are never overwritten: when a stamp is already taken, a
/// `_2`, `_3`, ... suffix is appended to it.
pub fn write_artifacts(
    report: &Report,
    dir: &Path,
    format: RecordsFormat,
    timestamp: DateTime<Utc>,
) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let records = match format {
        RecordsFormat::Csv => generate_csv_records(report)?,
        RecordsFormat::Json => generate_json_records(report)?,
    };

    let stamp = artifact_stamp(timestamp);
    let mut attempt = 1u32;
    let (suffix, records_path, mut records_file) = loop {
        let suffix = match attempt {
            1 => stamp.clone(),
            n => format!("{}_{}", stamp, n),
        };
        let path = dir.join(format!("seo_results_{}.{}", suffix, format.extension()));
        match create_new(&path) {
            Ok(file) => break (suffix, path, file),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create records file {}", path.display()))
            }
        }
    };

    records_file
        .write_all(records.as_bytes())
        .with_context(|| format!("Failed to write records to {}", records_path.display()))?;
    debug!("Wrote records: {}", records_path.display());

    let report_path = dir.join(format!("seo_report_{}.txt", suffix));
    create_new(&report_path)
        .and_then(|mut file| file.write_all(generate_text_report(report).as_bytes()))
        .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
    debug!("Wrote report: {}", report_path.display());

    Ok(ArtifactPaths {
        records: records_path,
        report: report_path,
    })
}

fn create_new(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::tests::sample_batch;
    use crate::analysis::build_report;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_write_csv_artifacts() {
        let dir = TempDir::new().unwrap();
        let report = build_report(&sample_batch());

        let paths = write_artifacts(&report, dir.path(), RecordsFormat::Csv, fixed_time()).unwrap();

        assert_eq!(
            paths.records.file_name().unwrap(),
            "seo_results_20240501_093000.csv"
        );
        assert_eq!(
            paths.report.file_name().unwrap(),
            "seo_report_20240501_093000.txt"
        );

        let csv = std::fs::read_to_string(&paths.records).unwrap();
        assert_eq!(csv.lines().count(), report.row_count() + 1);
        let text = std::fs::read_to_string(&paths.report).unwrap();
        assert!(text.contains("SEO Monitoring Summary Report"));
    }

    #[test]
    fn test_write_json_into_new_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("reports").join("daily");
        let report = build_report(&sample_batch());

        let paths = write_artifacts(&report, &nested, RecordsFormat::Json, fixed_time()).unwrap();

        assert!(paths.records.to_string_lossy().ends_with(".json"));
        let json = std::fs::read_to_string(&paths.records).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), report.row_count());
    }

    #[test]
    fn test_same_second_keeps_earlier_artifacts() {
        let dir = TempDir::new().unwrap();
        let report = build_report(&sample_batch());

        let first = write_artifacts(&report, dir.path(), RecordsFormat::Csv, fixed_time()).unwrap();
        let first_text = std::fs::read_to_string(&first.report).unwrap();
        let second = write_artifacts(&report, dir.path(), RecordsFormat::Csv, fixed_time()).unwrap();

        assert_ne!(first, second);
        assert_eq!(
            second.records.file_name().unwrap(),
            "seo_results_20240501_093000_2.csv"
        );
        assert_eq!(
            second.report.file_name().unwrap(),
            "seo_report_20240501_093000_2.txt"
        );
        assert_eq!(std::fs::read_to_string(&first.report).unwrap(), first_text);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
    }

    #[test]
    fn test_unwritable_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        let report = build_report(&sample_batch());

        let result = write_artifacts(&report, &blocker, RecordsFormat::Csv, fixed_time());
        assert!(result.is_err());
    }
}
