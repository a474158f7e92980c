//! Bulk ingestion of exported cost-line spreadsheets.
//!
//! Trip exports carry one row per cost line, several rows per request.
//! Rows sharing a request id are folded into one [`TarInput`] for
//! validation.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::extract::dates::{normalize_date, parse_iso_date};
use crate::models::tar::TarInput;

/// One cost line from an exported spreadsheet. Amount columns are kept as
/// raw strings so currency symbols and thousands separators survive the
/// CSV decode.
#[derive(Debug, Clone, Deserialize)]
pub struct CostLineRow {
    #[serde(rename = "Request ID")]
    pub request_id: String,
    #[serde(rename = "Traveler", default)]
    pub traveler: String,
    #[serde(rename = "Date Submitted", default)]
    pub date_submitted: String,
    #[serde(rename = "Departure Date", default)]
    pub departure_date: String,
    #[serde(rename = "Return Date", default)]
    pub return_date: String,
    #[serde(rename = "Destination", default)]
    pub destination: String,
    #[serde(rename = "Purpose", default)]
    pub purpose: String,
    #[serde(rename = "Contact", default)]
    pub contact: String,
    #[serde(rename = "Cost", default)]
    pub cost: String,
    #[serde(rename = "Total", default)]
    pub total: String,
}

/// Read cost lines from a CSV file. Rows with a blank request id are
/// skipped.
pub fn read_cost_lines(path: &Path) -> Result<Vec<CostLineRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.deserialize::<CostLineRow>() {
        let row = record?;
        if !row.request_id.trim().is_empty() {
            rows.push(row);
        }
    }

    debug!(path = %path.display(), rows = rows.len(), "cost lines read");
    Ok(rows)
}

#[derive(Default)]
struct RequestGroup {
    traveler: Option<String>,
    contact: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    destination: Option<String>,
    purpose: Option<String>,
    explicit_total: Option<Decimal>,
    itemized_sum: Decimal,
}

/// Fold cost-line rows into one input per request id, preserving the
/// first-seen order of request ids.
pub fn aggregate_rows(rows: &[CostLineRow]) -> Vec<TarInput> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, RequestGroup> = HashMap::new();

    for row in rows {
        let id = row.request_id.trim().to_string();
        let group = groups.entry(id.clone()).or_insert_with(|| {
            order.push(id.clone());
            RequestGroup::default()
        });

        if group.traveler.is_none() {
            group.traveler = non_blank(&row.traveler);
        }
        if group.contact.is_none() {
            group.contact = non_blank(&row.contact);
        }
        if group.destination.is_none() {
            group.destination = non_blank(&row.destination);
        }
        if group.purpose.is_none() {
            group.purpose = non_blank(&row.purpose);
        }

        // The trip starts at the earliest departure, falling back to the
        // submission date, and ends at the latest return.
        let start = parse_date(&row.departure_date).or_else(|| parse_date(&row.date_submitted));
        if let Some(date) = start {
            group.start = Some(group.start.map_or(date, |s| s.min(date)));
        }
        if let Some(date) = parse_date(&row.return_date) {
            group.end = Some(group.end.map_or(date, |e| e.max(date)));
        }

        if group.explicit_total.is_none() {
            group.explicit_total = parse_amount(&row.total).filter(|t| !t.is_zero());
        }
        if let Some(cost) = parse_amount(&row.cost) {
            group.itemized_sum += cost;
        }
    }

    order
        .into_iter()
        .map(|id| {
            let group = groups.remove(&id).unwrap_or_default();
            let total = group.explicit_total.unwrap_or(group.itemized_sum);

            TarInput {
                authorization_number: Some(id),
                traveler_name: group.traveler,
                contact_number: group.contact,
                duty_station: group.destination,
                travel_purpose: group.purpose,
                estimated_cost: Some(total),
                departure_date: group.start.map(|d| d.format("%Y-%m-%d").to_string()),
                return_date: group.end.map(|d| d.format("%Y-%m-%d").to_string()),
                ..Default::default()
            }
        })
        .collect()
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_iso_date(&normalize_date(raw.trim()))
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    Decimal::from_str(&cleaned).ok()
}
