//! Expected trip cost calculation.

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::extract::dates::{parse_iso_date, trip_duration_days};
use crate::models::config::RateConfig;
use crate::models::tar::{CostBreakdownItem, ExpectedCosts, MergedTarData};
use crate::rates::RateSource;

/// Calculates the expected cost of a trip from published per-diem rates.
///
/// When the merged data carries usable itinerary stops, each stop is costed
/// individually at its own location's rate. Otherwise a single lookup at the
/// duty station is multiplied by the trip duration. A stop or trip whose
/// rate cannot be fetched is costed at the configured default rates.
pub struct CostCalculator<'a> {
    rates: &'a dyn RateSource,
    config: &'a RateConfig,
}

impl<'a> CostCalculator<'a> {
    pub fn new(rates: &'a dyn RateSource, config: &'a RateConfig) -> Self {
        Self { rates, config }
    }

    pub fn expected_costs(&self, data: &MergedTarData) -> ExpectedCosts {
        let year = rate_year(data.departure_date.as_deref());

        let stops: Vec<_> = data
            .itinerary
            .iter()
            .filter(|stop| stop.city.is_some())
            .collect();

        if !stops.is_empty() {
            return self.itinerary_costs(&stops, year);
        }
        self.duration_costs(data, year)
    }

    /// One breakdown item per stop, each at its own location's daily rate.
    fn itinerary_costs(
        &self,
        stops: &[&crate::models::tar::ItineraryStop],
        year: i32,
    ) -> ExpectedCosts {
        // Repeated stops at the same location reuse one lookup per run.
        let mut cache: HashMap<(String, String), (Decimal, Decimal)> = HashMap::new();
        let mut breakdown = Vec::with_capacity(stops.len());
        let mut total = Decimal::ZERO;

        for stop in stops {
            let city = stop.city.clone().unwrap_or_default();
            let state = stop.state.clone().unwrap_or_default();

            let (mie, lodging) = *cache
                .entry((city.to_lowercase(), state.to_lowercase()))
                .or_insert_with(|| self.daily_rate(&city, &state, year));

            let item_total = mie + lodging;
            total += item_total;

            breakdown.push(CostBreakdownItem {
                location: format_location(&city, &state),
                date: stop.date.clone().unwrap_or_else(today_iso),
                mie,
                lodging,
                total: item_total,
            });
        }

        debug!(stops = breakdown.len(), %total, "itinerary costing complete");
        ExpectedCosts {
            total_expected: total,
            breakdown,
        }
    }

    /// One lookup at the duty station multiplied by the inclusive trip
    /// duration. Without a resolvable city there is nothing to cost.
    fn duration_costs(&self, data: &MergedTarData, year: i32) -> ExpectedCosts {
        let Some(city) = data.city.as_deref().filter(|c| !c.trim().is_empty()) else {
            debug!("no itinerary and no duty station city, expected cost is zero");
            return ExpectedCosts::default();
        };
        let state = data.state.as_deref().unwrap_or_default();

        let (mie, lodging) = self.daily_rate(city, state, year);
        let duration = trip_duration_days(
            data.departure_date.as_deref(),
            data.return_date.as_deref(),
        );
        let total = (mie + lodging) * Decimal::from(duration);

        debug!(%city, %state, duration, %total, "duration costing complete");
        ExpectedCosts {
            total_expected: total,
            breakdown: vec![CostBreakdownItem {
                location: format_location(city, state),
                date: data.departure_date.clone().unwrap_or_else(today_iso),
                mie,
                lodging,
                total,
            }],
        }
    }

    fn daily_rate(&self, city: &str, state: &str, year: i32) -> (Decimal, Decimal) {
        match self.rates.fetch_rate(city, state, year) {
            Some(entry) => (entry.meals, entry.average_lodging()),
            None => (self.config.default_mie, self.config.default_lodging),
        }
    }
}

/// "City, ST", or just the city when no state is known.
fn format_location(city: &str, state: &str) -> String {
    if state.trim().is_empty() {
        city.to_string()
    } else {
        format!("{}, {}", city, state)
    }
}

/// Year the rates are fetched for: the departure year when the departure
/// date parses, the current year otherwise.
fn rate_year(departure: Option<&str>) -> i32 {
    departure
        .and_then(parse_iso_date)
        .map(|d| d.year())
        .unwrap_or_else(|| Utc::now().year())
}

fn today_iso() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
