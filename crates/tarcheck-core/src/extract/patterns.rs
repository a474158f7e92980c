//! Recognition pattern library for TAR document fields.
//!
//! Each field maps to an ordered list of compiled patterns tried in
//! sequence; the first pattern producing a non-empty captured group wins.
//! New document layouts are supported by adding patterns to these tables,
//! not by adding code.

use lazy_static::lazy_static;
use regex::Regex;

/// Text fields recognized by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    AuthorizationNumber,
    TravelerName,
    Title,
    VendorCode,
    CurrentAddress,
    OfficeDivision,
    DutyStation,
    ContactNumber,
    TravelPurpose,
    BriefDescription,
}

/// Monetary fields recognized by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    EstimatedCost,
    PerDiem,
    AirRail,
    Lodging,
    RentalCar,
    Miscellaneous,
}

// Reusable fragments. Money values may carry a currency symbol and
// thousands separators; dates are US-style MM/DD/YYYY or MM-DD-YYYY.
const MONEY: &str = r"\$?\s*([\d,]+(?:\.\d{1,2})?)";
const US_DATE: &str = r"(\d{1,2}[/-]\d{1,2}[/-]\d{4})";

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid built-in pattern")
}

lazy_static! {
    /// Ordered pattern lists per text field.
    pub static ref TEXT_FIELD_PATTERNS: Vec<(TextField, Vec<Regex>)> = vec![
        (
            TextField::AuthorizationNumber,
            vec![
                rx(r"(?i)(?:travel\s+authorization|authorization)\s*(?:no\.?|number|#)[\s:]*([A-Z0-9][A-Z0-9/-]*)"),
                rx(r"(?i)\bTA\s*[-#]\s*([A-Z0-9][A-Z0-9/-]*)"),
            ],
        ),
        (
            TextField::TravelerName,
            vec![
                // Normalization leaves single spaces within a line, so name
                // words are joined by one literal space (never a newline).
                rx(r"(?i)(?:name\s+of\s+traveler|traveler(?:'s)?\s+name|employee\s+name)[\s:]+([A-Z][A-Za-z.'-]*(?: [A-Z][A-Za-z.'-]*)+)"),
                rx(r"(?i)\btraveler[\s:]+([A-Z][A-Za-z.'-]*(?: [A-Z][A-Za-z.'-]*)+)"),
                rx(r"(?im)^name[\s:]+([A-Z][A-Za-z.'-]*(?: [A-Z][A-Za-z.'-]*)+)"),
            ],
        ),
        (
            TextField::Title,
            vec![
                rx(r"(?i)(?:job\s+title|position\s+title)[\s:]+([^\n]+)"),
                rx(r"(?im)^title[\s:]+([^\n]+)"),
            ],
        ),
        (
            TextField::VendorCode,
            vec![
                rx(r"(?i)vendor\s*(?:code|id|number|no\.?)[\s:]*([A-Z]?\d{8,9})"),
                rx(r"\b(E\d{8,9})\b"),
            ],
        ),
        (
            TextField::CurrentAddress,
            vec![
                rx(r"(?i)(?:current\s+address|home\s+address|mailing\s+address)[\s:]+([^\n]+)"),
                rx(r"(?im)^address[\s:]+([^\n]+)"),
            ],
        ),
        (
            TextField::OfficeDivision,
            vec![
                rx(r"(?i)office\s*/?\s*division[\s:]+([^\n]+)"),
                rx(r"(?im)^(?:division|office)[\s:]+([^\n]+)"),
            ],
        ),
        (
            TextField::DutyStation,
            vec![
                rx(r"(?i)(?:official\s+)?duty\s+station[\s:]+([^\n]+)"),
                rx(r"(?i)\bdestination[\s:]+([^\n]+)"),
            ],
        ),
        (
            TextField::ContactNumber,
            vec![
                rx(r"(?i)(?:contact\s+(?:number|no\.?)|point\s+of\s+contact)[\s:]+([+(]?\d[\d\s().+-]{5,})"),
                rx(r"(?i)(?:telephone|phone)(?:\s+(?:number|no\.?))?[\s:]+([+(]?\d[\d\s().+-]{5,})"),
            ],
        ),
        (
            TextField::TravelPurpose,
            vec![
                rx(r"(?i)(?:purpose\s+of\s+travel|travel\s+purpose)[\s:]+([^\n]+)"),
                rx(r"(?im)^purpose[\s:]+([^\n]+)"),
            ],
        ),
        (
            TextField::BriefDescription,
            vec![
                rx(r"(?i)brief\s+description(?:\s+of\s+\w+)?[\s:]+([^\n]+)"),
                rx(r"(?im)^description[\s:]+([^\n]+)"),
            ],
        ),
    ];

    /// Ordered pattern lists per monetary field. Captured group holds the
    /// raw amount, possibly with thousands separators.
    pub static ref NUMERIC_FIELD_PATTERNS: Vec<(NumericField, Vec<Regex>)> = vec![
        (
            NumericField::EstimatedCost,
            vec![
                rx(&format!(r"(?i)(?:total\s+estimated\s+cost|estimated\s+(?:total\s+)?cost)[\s:]*{MONEY}")),
                rx(&format!(r"(?i)estimated\s+amount[\s:]*{MONEY}")),
                rx(&format!(r"(?i)total\s+cost[\s:]*{MONEY}")),
            ],
        ),
        (
            NumericField::PerDiem,
            vec![rx(&format!(r"(?i)per\s*diem[\s:]*{MONEY}"))],
        ),
        (
            NumericField::AirRail,
            vec![
                rx(&format!(r"(?i)air\s*/?\s*rail[\s:]*{MONEY}")),
                rx(&format!(r"(?i)(?:airfare|common\s+carrier)[\s:]*{MONEY}")),
            ],
        ),
        (
            NumericField::Lodging,
            vec![rx(&format!(r"(?i)lodging[\s:]*{MONEY}"))],
        ),
        (
            NumericField::RentalCar,
            vec![
                rx(&format!(r"(?i)rental\s+car[\s:]*{MONEY}")),
                rx(&format!(r"(?i)car\s+rental[\s:]*{MONEY}")),
            ],
        ),
        (
            NumericField::Miscellaneous,
            vec![rx(&format!(r"(?i)misc(?:ellaneous)?\.?[\s:]*{MONEY}"))],
        ),
    ];

    /// Keyword-anchored departure date patterns.
    pub static ref DEPARTURE_DATE_PATTERNS: Vec<Regex> = vec![
        rx(&format!(r"(?i)departure(?:\s+date)?[^\n\d]*{US_DATE}")),
        rx(&format!(r"(?i)\bdepart(?:ing)?\b[^\n\d]*{US_DATE}")),
        rx(&format!(r"(?i)\bleave\b[^\n\d]*{US_DATE}")),
    ];

    /// Keyword-anchored return date patterns.
    pub static ref RETURN_DATE_PATTERNS: Vec<Regex> = vec![
        rx(&format!(r"(?i)return(?:\s+date)?[^\n\d]*{US_DATE}")),
        rx(&format!(r"(?i)arrive\s+back[^\n\d]*{US_DATE}")),
        rx(&format!(r"(?i)\bend(?:\s+date)?\b[^\n\d]*{US_DATE}")),
    ];

    /// Ordered itinerary section header patterns. Case-sensitive on
    /// purpose: only an all-caps heading anchors a section, never a prose
    /// mention like "the itinerary is attached".
    pub static ref ITINERARY_HEADERS: Vec<Regex> = vec![
        rx(r"AUTHORIZED\s+OFFICIAL\s+ITINERARY"),
        rx(r"\bITINERARY\b"),
        rx(r"TRAVEL\s+SCHEDULE"),
    ];

    /// Date pattern variants tried across a located itinerary section.
    /// The first variant yielding at least one match wins.
    pub static ref ITINERARY_DATE_VARIANTS: Vec<Regex> = vec![
        rx(r"\b\d{1,2}/\d{1,2}/\d{4}\b"),
        rx(r"\b\d{1,2}-\d{1,2}-\d{4}\b"),
        rx(r"\b\d{4}-\d{2}-\d{2}\b"),
    ];

    /// Location pattern variants: captures (city, two-letter state).
    pub static ref ITINERARY_LOCATION_VARIANTS: Vec<Regex> = vec![
        rx(r"([A-Z][A-Za-z.'-]*(?: [A-Za-z.'-]+)*),\s*([A-Z]{2})\b"),
        rx(r"([A-Z][A-Za-z.'-]*(?: [A-Za-z.'-]+)*) ([A-Z]{2}) \d{5}\b"),
    ];

    /// Whole-document fallback: travel-keyword-anchored "City, ST" mentions.
    pub static ref TRAVEL_KEYWORD_LOCATIONS: Vec<Regex> = vec![
        // Keywords match case-insensitively; the city itself must be
        // capitalized, so the flag is scoped to the keyword group.
        rx(r"(?i:travel(?:ing|s)?\s+to|trip\s+to|visit(?:ing)?|go(?:ing)?\s+to)\s+([A-Z][A-Za-z.'-]*(?: [A-Za-z.'-]+)*),\s*([A-Z]{2})\b"),
        rx(r"(?i:from|depart(?:ing)?(?:\s+from)?)\s+([A-Z][A-Za-z.'-]*(?: [A-Za-z.'-]+)*),\s*([A-Z]{2})\b"),
        rx(r"(?i:arriv(?:e|ing)\s+(?:in|at)|return(?:ing)?\s+to)\s+([A-Z][A-Za-z.'-]*(?: [A-Za-z.'-]+)*),\s*([A-Z]{2})\b"),
    ];

    /// An all-caps heading line of at least three letters ends an itinerary
    /// section. The letter count is enforced in code.
    pub static ref ALL_CAPS_HEADING: Regex = rx(r"(?m)^[A-Z][A-Z .&/-]*$");

    /// Vendor code format: E followed by 8-9 digits.
    pub static ref VENDOR_CODE_FORMAT: Regex = rx(r"^E\d{8,9}$");

    /// Phone format applied after stripping spaces, dashes, and parentheses.
    pub static ref PHONE_FORMAT: Regex = rx(r"^[+]?\d{7,15}$");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
        patterns.iter().find_map(|p| {
            p.captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        })
    }

    #[test]
    fn test_traveler_name_patterns() {
        let patterns = &TEXT_FIELD_PATTERNS
            .iter()
            .find(|(f, _)| *f == TextField::TravelerName)
            .unwrap()
            .1;

        assert_eq!(
            first_capture(patterns, "Name of Traveler: John Q. Public"),
            Some("John Q. Public".to_string())
        );
        assert_eq!(
            first_capture(patterns, "Traveler: Mary Smith\nTitle: Analyst"),
            Some("Mary Smith".to_string())
        );
    }

    #[test]
    fn test_estimated_cost_ordered_fallback() {
        let patterns = &NUMERIC_FIELD_PATTERNS
            .iter()
            .find(|(f, _)| *f == NumericField::EstimatedCost)
            .unwrap()
            .1;

        // Labeled pattern wins over the generic "total cost" fallback.
        let text = "Total Cost: $9,999.00\nTotal Estimated Cost: $1,234.56";
        assert_eq!(first_capture(patterns, text), Some("1,234.56".to_string()));
    }

    #[test]
    fn test_vendor_code_standalone() {
        let patterns = &TEXT_FIELD_PATTERNS
            .iter()
            .find(|(f, _)| *f == TextField::VendorCode)
            .unwrap()
            .1;

        assert_eq!(
            first_capture(patterns, "payee E123456789 on file"),
            Some("E123456789".to_string())
        );
    }

    #[test]
    fn test_departure_date_keyword_anchors() {
        let text = "Travel dates. Depart on 05/01/2025 and return on 05/04/2025.";
        let dep = first_capture(&DEPARTURE_DATE_PATTERNS, text);
        let ret = first_capture(&RETURN_DATE_PATTERNS, text);
        assert_eq!(dep, Some("05/01/2025".to_string()));
        assert_eq!(ret, Some("05/04/2025".to_string()));
    }

    #[test]
    fn test_vendor_and_phone_formats() {
        assert!(VENDOR_CODE_FORMAT.is_match("E12345678"));
        assert!(VENDOR_CODE_FORMAT.is_match("E123456789"));
        assert!(!VENDOR_CODE_FORMAT.is_match("E1234567"));
        assert!(!VENDOR_CODE_FORMAT.is_match("X12345678"));

        assert!(PHONE_FORMAT.is_match("5551234567"));
        assert!(PHONE_FORMAT.is_match("+15551234567"));
        assert!(!PHONE_FORMAT.is_match("123456"));
    }
}
