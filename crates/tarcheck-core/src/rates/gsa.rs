//! GSA per-diem API client.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RateError;
use crate::models::config::RateConfig;

use super::{LodgingRate, RateEntry, RateSource, normalize_state, sanitize_city};

/// One rate record from the per-diem API: a numeric-string M&IE field plus
/// twelve month-keyed lodging fields, each a number or a "low-high" string.
#[derive(Debug, Deserialize)]
struct GsaRateRecord {
    #[serde(rename = "Meals")]
    meals: String,
    #[serde(rename = "Jan")]
    jan: Option<Value>,
    #[serde(rename = "Feb")]
    feb: Option<Value>,
    #[serde(rename = "Mar")]
    mar: Option<Value>,
    #[serde(rename = "Apr")]
    apr: Option<Value>,
    #[serde(rename = "May")]
    may: Option<Value>,
    #[serde(rename = "Jun")]
    jun: Option<Value>,
    #[serde(rename = "Jul")]
    jul: Option<Value>,
    #[serde(rename = "Aug")]
    aug: Option<Value>,
    #[serde(rename = "Sep")]
    sep: Option<Value>,
    #[serde(rename = "Oct")]
    oct: Option<Value>,
    #[serde(rename = "Nov")]
    nov: Option<Value>,
    #[serde(rename = "Dec")]
    dec: Option<Value>,
}

impl GsaRateRecord {
    fn into_entry(self) -> Option<RateEntry> {
        let meals: Decimal = self.meals.trim().parse().ok()?;

        let months = [
            self.jan, self.feb, self.mar, self.apr, self.may, self.jun, self.jul, self.aug,
            self.sep, self.oct, self.nov, self.dec,
        ];
        let lodging_by_month = months
            .into_iter()
            .map(|month| month.as_ref().and_then(parse_month_value))
            .collect();

        Some(RateEntry {
            meals,
            lodging_by_month,
        })
    }
}

/// A month field is either a JSON number or a string that may hold a
/// "low-high" range.
fn parse_month_value(value: &Value) -> Option<LodgingRate> {
    match value {
        Value::Number(n) => LodgingRate::parse(&n.to_string()),
        Value::String(s) => LodgingRate::parse(s),
        _ => None,
    }
}

/// Blocking HTTP client for the GSA per-diem rate API.
///
/// One request per lookup; no retries. Any failure (transport, non-success
/// status, empty result set, malformed record) is reported as an absent
/// rate, never an error.
pub struct GsaPerDiemClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GsaPerDiemClient {
    pub fn new(config: &RateConfig) -> Result<Self, RateError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RateError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Attach an API key sent as the `X-Api-Key` header.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn request(&self, city: &str, state: &str, year: i32) -> reqwest::blocking::RequestBuilder {
        let url = format!(
            "{}/rates/city/{}/state/{}/year/{}",
            self.base_url,
            city.replace(' ', "%20"),
            state,
            year
        );

        let mut request = self.http.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key.clone());
        }
        request
    }
}

impl RateSource for GsaPerDiemClient {
    fn fetch_rate(&self, city: &str, state: &str, year: i32) -> Option<RateEntry> {
        if city.trim().is_empty() || state.trim().is_empty() {
            return None;
        }

        let city = sanitize_city(city);
        let state = normalize_state(state);

        let response = match self.request(&city, &state, year).send() {
            Ok(response) => response,
            Err(e) => {
                warn!("rate lookup failed for {city}, {state}: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                "rate lookup for {city}, {state} returned {}",
                response.status()
            );
            return None;
        }

        let records: Vec<GsaRateRecord> = match response.json() {
            Ok(records) => records,
            Err(e) => {
                warn!("malformed rate response for {city}, {state}: {e}");
                return None;
            }
        };

        let entry = records.into_iter().next().and_then(GsaRateRecord::into_entry);
        match &entry {
            Some(rate) => debug!(
                "rate for {city}, {state} ({year}): mie={} lodging_avg={}",
                rate.meals,
                rate.average_lodging()
            ),
            None => debug!("no published rate for {city}, {state} ({year})"),
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_record_decodes_numbers_and_ranges() {
        let json = r#"{
            "Meals": "79",
            "Jan": 250, "Feb": 250, "Mar": "250", "Apr": "200-300",
            "May": 250, "Jun": 250, "Jul": 250, "Aug": 250,
            "Sep": 250, "Oct": 250, "Nov": 250, "Dec": 250
        }"#;

        let record: GsaRateRecord = serde_json::from_str(json).unwrap();
        let entry = record.into_entry().unwrap();

        assert_eq!(entry.meals, dec("79"));
        assert_eq!(entry.lodging_by_month.len(), 12);
        assert_eq!(entry.lodging_by_month[3], Some(LodgingRate::Range(dec("200"), dec("300"))));
        assert_eq!(entry.average_lodging(), dec("250"));
    }

    #[test]
    fn test_record_with_missing_months() {
        let json = r#"{"Meals": "64", "Jan": 100, "Feb": "n/a"}"#;
        let record: GsaRateRecord = serde_json::from_str(json).unwrap();
        let entry = record.into_entry().unwrap();

        assert_eq!(entry.lodging_by_month[0], Some(LodgingRate::Flat(dec("100"))));
        assert_eq!(entry.lodging_by_month[1], None);
        assert_eq!(entry.average_lodging(), dec("100"));
    }

    #[test]
    fn test_unparseable_meals_drops_record() {
        let json = r#"{"Meals": "varies", "Jan": 100}"#;
        let record: GsaRateRecord = serde_json::from_str(json).unwrap();
        assert!(record.into_entry().is_none());
    }
}
