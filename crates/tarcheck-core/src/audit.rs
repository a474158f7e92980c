//! Append-only audit log of validation outcomes.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::models::tar::ValidationReport;

/// Sink for completed validation reports.
///
/// Logging is best-effort at the pipeline boundary; a failed append never
/// fails the validation itself.
pub trait AuditSink {
    fn append(&self, report: &ValidationReport) -> Result<()>;
}

/// One audit row per validation run.
#[derive(Debug, Serialize)]
struct AuditRow<'a> {
    timestamp: String,
    traveler: &'a str,
    #[serde(rename = "authorizationNumber")]
    authorization_number: &'a str,
    #[serde(rename = "expectedCost")]
    expected_cost: String,
    #[serde(rename = "claimedCost")]
    claimed_cost: String,
    variance: String,
    #[serde(rename = "variancePercent")]
    variance_percent: String,
    status: &'static str,
}

/// CSV-backed audit log. Rows are appended; the header is written only when
/// the file is new or empty.
pub struct CsvAuditLog {
    path: PathBuf,
}

impl CsvAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn needs_header(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true)
    }
}

impl AuditSink for CsvAuditLog {
    fn append(&self, report: &ValidationReport) -> Result<()> {
        let needs_header = self.needs_header();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        writer.serialize(AuditRow {
            timestamp: report.timestamp.to_rfc3339(),
            traveler: &report.traveler,
            authorization_number: report.authorization_number.as_deref().unwrap_or(""),
            expected_cost: report.expected_costs.total_expected.to_string(),
            claimed_cost: report.claimed_cost.to_string(),
            variance: report.variance.to_string(),
            variance_percent: report.variance_percent.to_string(),
            status: if report.is_valid() { "VALID" } else { "FLAGGED" },
        })?;
        writer.flush()?;

        debug!(path = %self.path.display(), "audit row appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tar::{ExpectedCosts, MergedTarData};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn report(valid: bool) -> ValidationReport {
        ValidationReport {
            timestamp: Utc::now(),
            traveler: "Jane Roe".to_string(),
            authorization_number: Some("TA-2025-0042".to_string()),
            extracted_data: MergedTarData::default(),
            expected_costs: ExpectedCosts {
                total_expected: Decimal::new(987, 0),
                breakdown: Vec::new(),
            },
            claimed_cost: Decimal::new(1000, 0),
            variance: Decimal::new(13, 0),
            variance_percent: Decimal::new(132, 2),
            is_within_buffer: valid,
            is_within_deviation: true,
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.csv");

        let log = CsvAuditLog::new(&path);
        log.append(&report(true)).unwrap();
        log.append(&report(false)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,traveler,authorizationNumber"));
        assert!(lines[1].contains("VALID"));
        assert!(lines[2].contains("FLAGGED"));
    }
}
