//! Data models for travel authorization request (TAR) validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single stop on an authorized itinerary.
///
/// Produced by pairing date matches with location matches found in the
/// itinerary section of a document. A stop is only emitted when it carries
/// at least a city or a date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryStop {
    /// Stop date as an ISO-8601 string (YYYY-MM-DD), when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Destination city.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Two-letter state code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ItineraryStop {
    /// Whether this stop carries enough data to be emitted.
    pub fn is_usable(&self) -> bool {
        self.city.is_some() || self.date.is_some()
    }
}

/// Sparse record of fields extracted from document text.
///
/// Unmatched fields are simply absent. Numeric fields that fail decimal
/// parsing are dropped rather than stored as malformed strings. The record
/// is immutable once produced by the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traveler_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duty_station: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_diem: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_rail: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lodging: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_car: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miscellaneous: Option<Decimal>,

    /// Departure date, normalized to YYYY-MM-DD where possible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<String>,
    /// Return date, normalized to YYYY-MM-DD where possible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,

    /// Ordered itinerary stops found in the document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub itinerary: Vec<ItineraryStop>,
}

/// Extraction confidence classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Flat field/value input for one validation run.
///
/// Manually supplied values always take precedence over extracted ones.
/// Alias fields (`traveler`, `purpose`, `city`/`state`, `poc`) are
/// canonicalized during merging when the canonical field is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TarInput {
    pub authorization_number: Option<String>,
    pub traveler_name: Option<String>,
    /// Alias for `traveler_name`.
    pub traveler: Option<String>,
    pub title: Option<String>,
    pub vendor_code: Option<String>,
    pub current_address: Option<String>,
    pub office_division: Option<String>,
    pub duty_station: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub contact_number: Option<String>,
    /// Alias for `contact_number`.
    pub poc: Option<String>,
    pub travel_purpose: Option<String>,
    /// Alias for `travel_purpose`.
    pub purpose: Option<String>,
    pub brief_description: Option<String>,

    pub estimated_cost: Option<Decimal>,
    pub per_diem: Option<Decimal>,
    pub air_rail: Option<Decimal>,
    pub lodging: Option<Decimal>,
    pub rental_car: Option<Decimal>,
    pub miscellaneous: Option<Decimal>,

    pub departure_date: Option<String>,
    pub return_date: Option<String>,

    /// Pre-populated itinerary, used in preference to extraction.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub itinerary: Vec<ItineraryStop>,

    /// Base64-encoded document bytes, extracted when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,

    /// Declared media type of the document payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}

/// Extracted and manual data merged into one canonical record.
///
/// Manual input wins field-by-field; aliases are resolved and city/state
/// are derived from the duty station (or vice versa) where possible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergedTarData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traveler_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duty_station: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_diem: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_rail: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lodging: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_car: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miscellaneous: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub itinerary: Vec<ItineraryStop>,
}

/// Expected cost for one itinerary stop (or the whole trip in duration mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdownItem {
    /// Location formatted as "City, ST".
    pub location: String,
    /// Date the item applies to (YYYY-MM-DD).
    pub date: String,
    /// Daily M&IE rate used.
    pub mie: Decimal,
    /// Daily lodging rate used (monthly average).
    pub lodging: Decimal,
    /// Total for this item.
    pub total: Decimal,
}

/// Expected trip cost with a per-stop breakdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedCosts {
    pub total_expected: Decimal,
    pub breakdown: Vec<CostBreakdownItem>,
}

/// Final structured report for one validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub traveler: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_number: Option<String>,
    pub extracted_data: MergedTarData,
    pub expected_costs: ExpectedCosts,
    pub claimed_cost: Decimal,
    /// claimed_cost - expected_costs.total_expected.
    pub variance: Decimal,
    /// Zero whenever total_expected is zero.
    pub variance_percent: Decimal,
    pub is_within_buffer: bool,
    pub is_within_deviation: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

impl ValidationReport {
    /// Both tolerance checks must hold for the trip to be valid.
    pub fn is_valid(&self) -> bool {
        self.is_within_buffer && self.is_within_deviation
    }
}

/// Outcome of the exposed `validate` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// False when validation failed before a report could be generated.
    pub success: bool,
    pub is_valid: bool,
    pub expected_cost: Decimal,
    pub claimed_cost: Decimal,
    pub variance: Decimal,
    pub variance_percent: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakdown: Vec<CostBreakdownItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Human-readable status line.
    pub message: String,
}

impl ValidationResult {
    /// Terminal result for a validation that failed before report generation.
    pub fn failure(errors: Vec<String>, warnings: Vec<String>) -> Self {
        let message = format!("\u{2717} Validation failed: {}", errors.join("; "));
        Self {
            success: false,
            is_valid: false,
            expected_cost: Decimal::ZERO,
            claimed_cost: Decimal::ZERO,
            variance: Decimal::ZERO,
            variance_percent: Decimal::ZERO,
            breakdown: Vec::new(),
            errors,
            warnings,
            message,
        }
    }

    /// Result for an unexpected internal error. The raw error is never
    /// surfaced to the caller boundary.
    pub fn system_error() -> Self {
        Self::failure(
            vec!["An unexpected error occurred during validation".to_string()],
            Vec::new(),
        )
    }
}
