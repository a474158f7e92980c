//! Variance report generation.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::models::config::ThresholdConfig;
use crate::models::tar::{ExpectedCosts, MergedTarData, ValidationReport, ValidationResult};

/// Builds the variance report and the caller-facing result from a merged
/// record and its expected costs.
pub struct ReportGenerator<'a> {
    thresholds: &'a ThresholdConfig,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(thresholds: &'a ThresholdConfig) -> Self {
        Self { thresholds }
    }

    pub fn generate(&self, data: &MergedTarData, expected: ExpectedCosts) -> ValidationReport {
        let claimed = data.estimated_cost.unwrap_or(Decimal::ZERO);
        let variance = claimed - expected.total_expected;

        // A zero expected total makes the relative measure meaningless.
        let raw_percent = if expected.total_expected.is_zero() {
            Decimal::ZERO
        } else {
            variance / expected.total_expected * Decimal::ONE_HUNDRED
        };

        let is_within_buffer = variance.abs() <= self.thresholds.cost_buffer;
        // The tolerance check uses the exact ratio; rounding is only for
        // display, so a deviation just past the limit cannot round back
        // inside it.
        let is_within_deviation = raw_percent.abs() <= self.thresholds.max_deviation_percent;
        let variance_percent = raw_percent.round_dp(2);

        let mut recommendations = Vec::new();
        if !is_within_buffer {
            recommendations.push(format!(
                "Cost variance of ${} exceeds the ${} buffer",
                variance.abs(),
                self.thresholds.cost_buffer
            ));
        }
        if !is_within_deviation {
            recommendations.push(format!(
                "Cost deviation of {}% exceeds the maximum allowed {}%",
                variance_percent.abs(),
                self.thresholds.max_deviation_percent
            ));
        }
        if expected.breakdown.is_empty() {
            recommendations.push(
                "No per-diem rates could be determined; manual review recommended".to_string(),
            );
        }

        info!(
            traveler = data.traveler_name.as_deref().unwrap_or("<unknown>"),
            %claimed,
            expected = %expected.total_expected,
            %variance,
            "report generated"
        );

        ValidationReport {
            timestamp: Utc::now(),
            traveler: data.traveler_name.clone().unwrap_or_default(),
            authorization_number: data.authorization_number.clone(),
            extracted_data: data.clone(),
            expected_costs: expected,
            claimed_cost: claimed,
            variance,
            variance_percent,
            is_within_buffer,
            is_within_deviation,
            recommendations,
        }
    }

    /// Fold a report into the caller-facing result.
    pub fn result(&self, report: &ValidationReport, warnings: Vec<String>) -> ValidationResult {
        let message = if report.is_valid() {
            format!(
                "\u{2713} Claimed cost ${} is within tolerance of expected ${}",
                report.claimed_cost, report.expected_costs.total_expected
            )
        } else {
            format!(
                "\u{26a0} Claimed cost ${} deviates from expected ${} by ${}",
                report.claimed_cost,
                report.expected_costs.total_expected,
                report.variance.abs()
            )
        };

        ValidationResult {
            success: true,
            is_valid: report.is_valid(),
            expected_cost: report.expected_costs.total_expected,
            claimed_cost: report.claimed_cost,
            variance: report.variance,
            variance_percent: report.variance_percent,
            breakdown: report.expected_costs.breakdown.clone(),
            errors: Vec::new(),
            warnings,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tar::CostBreakdownItem;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn data(claimed: &str) -> MergedTarData {
        MergedTarData {
            traveler_name: Some("Jane Roe".to_string()),
            estimated_cost: Some(dec(claimed)),
            ..Default::default()
        }
    }

    fn expected(total: &str) -> ExpectedCosts {
        ExpectedCosts {
            total_expected: dec(total),
            breakdown: vec![CostBreakdownItem {
                location: "Washington, DC".to_string(),
                date: "2025-05-01".to_string(),
                mie: dec("79"),
                lodging: dec("250"),
                total: dec(total),
            }],
        }
    }

    #[test]
    fn test_buffer_exceeded_deviation_held() {
        let thresholds = ThresholdConfig::default();
        let report = ReportGenerator::new(&thresholds).generate(&data("1000"), expected("987"));

        assert_eq!(report.variance, dec("13"));
        assert_eq!(report.variance_percent, dec("1.32"));
        assert!(!report.is_within_buffer);
        assert!(report.is_within_deviation);
        assert!(!report.is_valid());
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].contains("buffer"));
    }

    #[test]
    fn test_both_tolerances_exceeded() {
        let thresholds = ThresholdConfig::default();
        let report = ReportGenerator::new(&thresholds).generate(&data("1200"), expected("1000"));

        assert_eq!(report.variance, dec("200"));
        assert_eq!(report.variance_percent, dec("20.00"));
        assert_eq!(report.recommendations.len(), 2);
        assert!(report.recommendations[1].contains("20.00%"));
    }

    #[test]
    fn test_within_both_tolerances() {
        let thresholds = ThresholdConfig::default();
        let report = ReportGenerator::new(&thresholds).generate(&data("1005"), expected("1000"));

        assert!(report.is_valid());
        assert!(report.recommendations.is_empty());

        let result = ReportGenerator::new(&thresholds).result(&report, Vec::new());
        assert!(result.success);
        assert!(result.is_valid);
        assert!(result.message.starts_with('\u{2713}'));
    }

    #[test]
    fn test_deviation_checked_before_rounding() {
        // 15004 / 100000 = 15.004%, which displays as 15.00% but still
        // exceeds the 15% limit.
        let thresholds = ThresholdConfig::default();
        let report =
            ReportGenerator::new(&thresholds).generate(&data("115004"), expected("100000"));

        assert_eq!(report.variance_percent, dec("15.00"));
        assert!(!report.is_within_deviation);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("15.00%")));
    }

    #[test]
    fn test_underclaim_also_measured() {
        let thresholds = ThresholdConfig::default();
        let report = ReportGenerator::new(&thresholds).generate(&data("900"), expected("1000"));

        assert_eq!(report.variance, dec("-100"));
        assert!(!report.is_within_buffer);
    }

    #[test]
    fn test_zero_expected_yields_zero_percent() {
        let thresholds = ThresholdConfig::default();
        let report = ReportGenerator::new(&thresholds).generate(
            &data("500"),
            ExpectedCosts::default(),
        );

        assert_eq!(report.variance_percent, Decimal::ZERO);
        assert!(report.is_within_deviation);
        // Empty breakdown always asks for manual review.
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("manual review")));
    }

    #[test]
    fn test_invalid_result_message() {
        let thresholds = ThresholdConfig::default();
        let generator = ReportGenerator::new(&thresholds);
        let report = generator.generate(&data("1000"), expected("987"));
        let result = generator.result(&report, vec!["note".to_string()]);

        assert!(result.success);
        assert!(!result.is_valid);
        assert!(result.message.starts_with('\u{26a0}'));
        assert_eq!(result.warnings, vec!["note".to_string()]);
        assert_eq!(result.breakdown.len(), 1);
    }
}
