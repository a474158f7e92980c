//! Pattern-based field extraction from TAR document text.

pub mod dates;
pub mod itinerary;
pub mod normalize;
pub mod patterns;

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::tar::{Confidence, ExtractedRecord};

use dates::{is_valid_iso_date, normalize_date};
use normalize::normalize_text;
use patterns::{
    DEPARTURE_DATE_PATTERNS, NUMERIC_FIELD_PATTERNS, RETURN_DATE_PATTERNS, TEXT_FIELD_PATTERNS,
    NumericField, TextField,
};

/// Quality score assigned to an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityScore {
    pub earned: u32,
    pub possible: u32,
    pub confidence: Confidence,
}

/// Result of extracting one document.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Sparse structured record; unmatched fields are absent.
    pub record: ExtractedRecord,
    /// Completeness score over the weighted field set.
    pub quality: QualityScore,
    /// One message per missing required field, plus low-severity notes.
    pub issues: Vec<String>,
}

/// Pattern-based TAR field extractor.
pub struct TarExtractor {
    config: ExtractionConfig,
}

// Quality point weights.
const REQUIRED_POINTS: u32 = 20;
const SECONDARY_POINTS: u32 = 10;
const ITINERARY_POINTS: u32 = 20;
const NUMERIC_POINTS: u32 = 5;

impl TarExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract a structured record from raw document text.
    ///
    /// The text is normalized first; each field then tries its ordered
    /// pattern list, and the first non-empty captured group wins.
    pub fn extract(&self, raw_text: &str) -> ExtractionOutcome {
        let text = normalize_text(raw_text, &self.config);
        let mut record = ExtractedRecord::default();
        let mut issues = Vec::new();

        for (field, candidates) in TEXT_FIELD_PATTERNS.iter() {
            if let Some(value) = first_capture(candidates, &text) {
                set_text_field(&mut record, *field, value);
            }
        }

        for (field, candidates) in NUMERIC_FIELD_PATTERNS.iter() {
            // A match that fails decimal parsing drops the field rather
            // than storing a malformed string.
            if let Some(value) = first_capture(candidates, &text).and_then(|raw| parse_money(&raw))
            {
                set_numeric_field(&mut record, *field, value);
            }
        }

        record.departure_date = extract_date(&DEPARTURE_DATE_PATTERNS, &text, "departureDate", &mut issues);
        record.return_date = extract_date(&RETURN_DATE_PATTERNS, &text, "returnDate", &mut issues);

        record.itinerary = itinerary::extract_itinerary(&text);

        let (quality, mut score_issues) = score(&record);
        // Missing-field messages come first, extraction notes after.
        score_issues.append(&mut issues);

        debug!(
            earned = quality.earned,
            possible = quality.possible,
            confidence = ?quality.confidence,
            "extraction complete"
        );

        ExtractionOutcome {
            record,
            quality,
            issues: score_issues,
        }
    }
}

/// First non-empty captured group across an ordered pattern list.
fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|p| {
        p.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Parse a matched money string, stripping currency symbols and thousands
/// separators.
fn parse_money(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    Decimal::from_str(&cleaned).ok()
}

/// Keyword-anchored date extraction with normalization. A date that fails
/// to normalize is passed through unchanged but noted as an issue.
fn extract_date(
    patterns: &[Regex],
    text: &str,
    field: &str,
    issues: &mut Vec<String>,
) -> Option<String> {
    let raw = first_capture(patterns, text)?;
    let normalized = normalize_date(&raw);

    if !is_valid_iso_date(&normalized) {
        issues.push(format!(
            "{} '{}' could not be normalized to a calendar date",
            field, normalized
        ));
    }

    Some(normalized)
}

fn set_text_field(record: &mut ExtractedRecord, field: TextField, value: String) {
    let slot = match field {
        TextField::AuthorizationNumber => &mut record.authorization_number,
        TextField::TravelerName => &mut record.traveler_name,
        TextField::Title => &mut record.title,
        TextField::VendorCode => &mut record.vendor_code,
        TextField::CurrentAddress => &mut record.current_address,
        TextField::OfficeDivision => &mut record.office_division,
        TextField::DutyStation => &mut record.duty_station,
        TextField::ContactNumber => &mut record.contact_number,
        TextField::TravelPurpose => &mut record.travel_purpose,
        TextField::BriefDescription => &mut record.brief_description,
    };
    *slot = Some(value);
}

fn set_numeric_field(record: &mut ExtractedRecord, field: NumericField, value: Decimal) {
    let slot = match field {
        NumericField::EstimatedCost => &mut record.estimated_cost,
        NumericField::PerDiem => &mut record.per_diem,
        NumericField::AirRail => &mut record.air_rail,
        NumericField::Lodging => &mut record.lodging,
        NumericField::RentalCar => &mut record.rental_car,
        NumericField::Miscellaneous => &mut record.miscellaneous,
    };
    *slot = Some(value);
}

/// Weighted completeness score. Three required fields are worth 20 points
/// each, four secondary fields 10 each, itinerary presence 20, and up to
/// three extra numeric fields 5 each.
fn score(record: &ExtractedRecord) -> (QualityScore, Vec<String>) {
    let mut earned = 0;
    let mut possible = 0;
    let mut issues = Vec::new();

    let required: [(&str, bool); 3] = [
        ("travelerName", record.traveler_name.is_some()),
        ("estimatedCost", record.estimated_cost.is_some()),
        ("travelPurpose", record.travel_purpose.is_some()),
    ];
    for (name, present) in required {
        possible += REQUIRED_POINTS;
        if present {
            earned += REQUIRED_POINTS;
        } else {
            issues.push(format!("missing required field: {}", name));
        }
    }

    let secondary = [
        record.authorization_number.is_some(),
        record.duty_station.is_some(),
        record.departure_date.is_some(),
        record.return_date.is_some(),
    ];
    for present in secondary {
        possible += SECONDARY_POINTS;
        if present {
            earned += SECONDARY_POINTS;
        }
    }

    possible += ITINERARY_POINTS;
    if record.itinerary.is_empty() {
        issues.push("no itinerary data found".to_string());
    } else {
        earned += ITINERARY_POINTS;
    }

    let numeric = [
        record.per_diem.is_some(),
        record.air_rail.is_some(),
        record.lodging.is_some(),
    ];
    for present in numeric {
        possible += NUMERIC_POINTS;
        if present {
            earned += NUMERIC_POINTS;
        }
    }

    let ratio = earned as f32 / possible as f32;
    let confidence = if ratio >= 0.8 {
        Confidence::High
    } else if ratio >= 0.6 {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    (
        QualityScore {
            earned,
            possible,
            confidence,
        },
        issues,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_TAR: &str = "\
TRAVEL AUTHORIZATION REQUEST
Authorization Number: TA-2025-0042
Name of Traveler: John Q. Public
Title: Program Analyst
Vendor Code: E123456789
Office/Division: Field Operations
Duty Station: Washington, DC
Contact Number: (555) 123-4567
Purpose of Travel: Annual program review
Departure Date: 05/01/2025
Return Date: 05/03/2025

AUTHORIZED OFFICIAL ITINERARY
05/01/2025 Washington, DC
05/02/2025 Washington, DC
05/03/2025 Washington, DC

COST ESTIMATE
Per Diem: $237.00
Air/Rail: $450.00
Lodging: $ 500.00
Total Estimated Cost: $1,187.00
";

    fn extractor() -> TarExtractor {
        TarExtractor::new(ExtractionConfig::default())
    }

    #[test]
    fn test_full_extraction() {
        let outcome = extractor().extract(SAMPLE_TAR);
        let record = &outcome.record;

        assert_eq!(record.authorization_number.as_deref(), Some("TA-2025-0042"));
        assert_eq!(record.traveler_name.as_deref(), Some("John Q. Public"));
        assert_eq!(record.vendor_code.as_deref(), Some("E123456789"));
        assert_eq!(record.duty_station.as_deref(), Some("Washington, DC"));
        assert_eq!(record.travel_purpose.as_deref(), Some("Annual program review"));
        assert_eq!(record.departure_date.as_deref(), Some("2025-05-01"));
        assert_eq!(record.return_date.as_deref(), Some("2025-05-03"));
        assert_eq!(record.estimated_cost, Some(Decimal::new(118700, 2)));
        assert_eq!(record.per_diem, Some(Decimal::new(23700, 2)));
        assert_eq!(record.lodging, Some(Decimal::new(50000, 2)));
        assert_eq!(record.itinerary.len(), 3);
    }

    #[test]
    fn test_full_extraction_scores_high() {
        let outcome = extractor().extract(SAMPLE_TAR);
        assert_eq!(outcome.quality.confidence, Confidence::High);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_sparse_extraction_scores_low() {
        let outcome = extractor().extract("Purpose of Travel: Site visit");
        assert_eq!(outcome.quality.confidence, Confidence::Low);
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.contains("travelerName")));
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.contains("estimatedCost")));
        assert!(outcome.issues.iter().any(|i| i.contains("no itinerary")));
    }

    #[test]
    fn test_unmatched_fields_absent() {
        let outcome = extractor().extract("Traveler: Jane Roe");
        assert_eq!(outcome.record.traveler_name.as_deref(), Some("Jane Roe"));
        assert!(outcome.record.vendor_code.is_none());
        assert!(outcome.record.estimated_cost.is_none());
    }

    #[test]
    fn test_malformed_numeric_dropped() {
        // Thousands separators and currency symbols are stripped before
        // parsing; a value with no digits drops the field.
        assert_eq!(parse_money("1,187.00"), Some(Decimal::new(118700, 2)));
        assert_eq!(parse_money(""), None);
    }

    #[test]
    fn test_invalid_date_passthrough_with_issue() {
        let outcome = extractor().extract(
            "Traveler: Jane Roe\nDeparture Date: 13/45/2025\nTotal Estimated Cost: $100",
        );
        assert_eq!(outcome.record.departure_date.as_deref(), Some("13/45/2025"));
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.contains("departureDate") && i.contains("13/45/2025")));
    }

    #[test]
    fn test_ocr_corrected_amount() {
        let outcome = extractor().extract("Traveler: Jane Roe\nPer Diem: $5O0.00");
        assert_eq!(outcome.record.per_diem, Some(Decimal::new(50000, 2)));
    }
}
