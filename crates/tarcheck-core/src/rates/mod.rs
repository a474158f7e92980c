//! Per-diem rate lookup.

mod gsa;

pub use gsa::GsaPerDiemClient;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Daily lodging rate for one month: a flat value or a "low-high" range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LodgingRate {
    Flat(Decimal),
    Range(Decimal, Decimal),
}

impl LodgingRate {
    /// Flat value, or the midpoint of a range.
    pub fn value(&self) -> Decimal {
        match self {
            LodgingRate::Flat(v) => *v,
            LodgingRate::Range(low, high) => (*low + *high) / Decimal::TWO,
        }
    }

    /// Parse a month entry: a plain number or a "low-high" string.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();

        if let Ok(flat) = raw.parse::<Decimal>() {
            return Some(LodgingRate::Flat(flat));
        }

        let (low, high) = raw.split_once('-')?;
        let low = low.trim().parse::<Decimal>().ok()?;
        let high = high.trim().parse::<Decimal>().ok()?;
        Some(LodgingRate::Range(low, high))
    }
}

/// Per-diem rate for one (city, state, year).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateEntry {
    /// Daily M&IE rate.
    pub meals: Decimal,
    /// Lodging rate per month, January through December; unparseable
    /// months are absent.
    pub lodging_by_month: Vec<Option<LodgingRate>>,
}

impl RateEntry {
    /// Average the valid monthly lodging values (ranges as midpoints).
    /// All-invalid input averages to zero, not an error.
    pub fn average_lodging(&self) -> Decimal {
        let values: Vec<Decimal> = self
            .lodging_by_month
            .iter()
            .flatten()
            .map(LodgingRate::value)
            .collect();

        if values.is_empty() {
            return Decimal::ZERO;
        }

        let sum: Decimal = values.iter().sum();
        sum / Decimal::from(values.len())
    }
}

/// External per-diem rate source.
///
/// Lookup failures (network error, non-success response, empty result set)
/// are reported as `None`; callers fall back to configured defaults and this
/// is never escalated as an error.
pub trait RateSource {
    fn fetch_rate(&self, city: &str, state: &str, year: i32) -> Option<RateEntry>;
}

/// Sanitize a city name for use as a lookup key: hyphens, apostrophes, and
/// periods become spaces.
pub fn sanitize_city(city: &str) -> String {
    let replaced: String = city
        .chars()
        .map(|c| match c {
            '-' | '\'' | '.' => ' ',
            other => other,
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a state to an upper-cased two-letter code.
pub fn normalize_state(state: &str) -> String {
    state.trim().to_uppercase().chars().take(2).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_flat_and_range() {
        assert_eq!(LodgingRate::parse("250"), Some(LodgingRate::Flat(dec("250"))));
        assert_eq!(
            LodgingRate::parse("200-300"),
            Some(LodgingRate::Range(dec("200"), dec("300")))
        );
        assert_eq!(LodgingRate::parse("n/a"), None);
        assert_eq!(LodgingRate::parse(""), None);
    }

    #[test]
    fn test_range_midpoint() {
        assert_eq!(
            LodgingRate::Range(dec("200"), dec("300")).value(),
            dec("250")
        );
    }

    #[test]
    fn test_average_mixed_months() {
        let entry = RateEntry {
            meals: dec("79"),
            lodging_by_month: vec![
                Some(LodgingRate::Flat(dec("100"))),
                Some(LodgingRate::Range(dec("100"), dec("200"))),
                None,
                Some(LodgingRate::Flat(dec("200"))),
            ],
        };
        // (100 + 150 + 200) / 3
        assert_eq!(entry.average_lodging(), dec("150"));
    }

    #[test]
    fn test_average_all_invalid_is_zero() {
        let entry = RateEntry {
            meals: dec("79"),
            lodging_by_month: vec![None; 12],
        };
        assert_eq!(entry.average_lodging(), Decimal::ZERO);
    }

    #[test]
    fn test_average_twelve_uniform_months() {
        let entry = RateEntry {
            meals: dec("79"),
            lodging_by_month: vec![Some(LodgingRate::Flat(dec("250"))); 12],
        };
        assert_eq!(entry.average_lodging(), dec("250"));
    }

    #[test]
    fn test_sanitize_city() {
        assert_eq!(sanitize_city("Winston-Salem"), "Winston Salem");
        assert_eq!(sanitize_city("O'Fallon"), "O Fallon");
        assert_eq!(sanitize_city("St. Louis"), "St Louis");
    }

    #[test]
    fn test_normalize_state() {
        assert_eq!(normalize_state("dc"), "DC");
        assert_eq!(normalize_state(" Texas"), "TE");
    }
}
