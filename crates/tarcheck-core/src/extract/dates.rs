//! Date normalization and trip duration helpers.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref US_DATE: Regex = Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").unwrap();
}

/// Rewrite `MM/DD/YYYY` or `MM-DD-YYYY` to `YYYY-MM-DD`.
///
/// If the rewritten string is not a valid calendar date, the original input
/// is returned unchanged; callers that care should pair this with
/// [`is_valid_iso_date`] to surface a warning for the passthrough case.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();

    let Some(caps) = US_DATE.captures(trimmed) else {
        return raw.to_string();
    };

    let month: u32 = caps[1].parse().unwrap_or(0);
    let day: u32 = caps[2].parse().unwrap_or(0);
    let year: i32 = caps[3].parse().unwrap_or(0);

    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(_) => format!("{:04}-{:02}-{:02}", year, month, day),
        None => raw.to_string(),
    }
}

/// Whether a string parses as a valid `YYYY-MM-DD` date.
pub fn is_valid_iso_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok()
}

/// Parse a normalized `YYYY-MM-DD` string.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Inclusive trip duration in days, clamped to at least 1.
///
/// Invalid or missing dates default the duration to 1.
pub fn trip_duration_days(departure: Option<&str>, ret: Option<&str>) -> i64 {
    let (Some(start), Some(end)) = (
        departure.and_then(parse_iso_date),
        ret.and_then(parse_iso_date),
    ) else {
        return 1;
    };

    let days = (end - start).num_days();
    if days < 0 {
        1
    } else {
        days + 1
    }
}
