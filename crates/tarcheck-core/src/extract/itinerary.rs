//! Itinerary extraction from document text.

use std::collections::HashSet;

use tracing::debug;

use crate::models::tar::ItineraryStop;

use super::dates::normalize_date;
use super::patterns::{
    ALL_CAPS_HEADING, ITINERARY_DATE_VARIANTS, ITINERARY_HEADERS, ITINERARY_LOCATION_VARIANTS,
    TRAVEL_KEYWORD_LOCATIONS,
};

/// Extract itinerary stops from normalized document text.
///
/// A located section is scanned with date and location pattern variants;
/// the i-th date is paired with the i-th location. Only when no section
/// header is found at all is the whole document scanned for
/// travel-keyword-anchored "City, ST" mentions, which yields dateless
/// stops. A located section that parses to nothing stays empty so the
/// cost calculation falls back to duration mode at the duty station.
pub fn extract_itinerary(text: &str) -> Vec<ItineraryStop> {
    if let Some(section) = locate_section(text) {
        let stops = extract_from_section(section);
        debug!("extracted {} stops from itinerary section", stops.len());
        return stops;
    }

    let stops = keyword_fallback(text);
    debug!("keyword fallback produced {} dateless stops", stops.len());
    stops
}

/// Locate the itinerary section: text from the first matching header to the
/// next blank line, the next all-caps heading of at least three letters, or
/// the end of the document.
fn locate_section(text: &str) -> Option<&str> {
    let header = ITINERARY_HEADERS.iter().find_map(|p| p.find(text))?;

    // The section body starts on the line after the header.
    let after_header = &text[header.end()..];
    let body_start = after_header
        .find('\n')
        .map(|i| i + 1)
        .unwrap_or(after_header.len());
    let body = &after_header[body_start..];

    let mut end = body.len();

    if let Some(blank) = body.find("\n\n") {
        end = end.min(blank);
    }

    for heading in ALL_CAPS_HEADING.find_iter(body) {
        let letters = heading.as_str().chars().filter(|c| c.is_ascii_alphabetic()).count();
        if letters >= 3 {
            end = end.min(heading.start());
            break;
        }
    }

    Some(&body[..end])
}

/// Pair dates with locations found inside the located section.
fn extract_from_section(section: &str) -> Vec<ItineraryStop> {
    // The first variant with at least one match across the whole section
    // wins; variants are not mixed per-entry.
    let dates: Vec<String> = ITINERARY_DATE_VARIANTS
        .iter()
        .map(|p| {
            p.find_iter(section)
                .map(|m| normalize_date(m.as_str()))
                .collect::<Vec<_>>()
        })
        .find(|found| !found.is_empty())
        .unwrap_or_default();

    let locations: Vec<(String, String)> = ITINERARY_LOCATION_VARIANTS
        .iter()
        .map(|p| {
            p.captures_iter(section)
                .map(|c| (c[1].trim().to_string(), c[2].to_string()))
                .collect::<Vec<_>>()
        })
        .find(|found| !found.is_empty())
        .unwrap_or_default();

    let mut stops = Vec::new();

    if dates.len() >= locations.len() {
        // Extra dates reuse the last known location.
        for (i, date) in dates.iter().enumerate() {
            let location = locations.get(i).or_else(|| locations.last());
            stops.push(ItineraryStop {
                date: Some(date.clone()),
                city: location.map(|(city, _)| city.clone()),
                state: location.map(|(_, state)| state.clone()),
            });
        }
    } else {
        // Extra locations beyond the date count are omitted.
        for (date, (city, state)) in dates.iter().zip(locations.iter()) {
            stops.push(ItineraryStop {
                date: Some(date.clone()),
                city: Some(city.clone()),
                state: Some(state.clone()),
            });
        }
    }

    stops.retain(ItineraryStop::is_usable);
    stops
}

/// Scan the entire document for travel-keyword-anchored locations,
/// deduplicating by (city, state).
fn keyword_fallback(text: &str) -> Vec<ItineraryStop> {
    let mut mentions: Vec<(usize, String, String)> = Vec::new();

    for pattern in TRAVEL_KEYWORD_LOCATIONS.iter() {
        for caps in pattern.captures_iter(text) {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            mentions.push((start, caps[1].trim().to_string(), caps[2].to_string()));
        }
    }

    // Preserve document order across keyword variants.
    mentions.sort_by_key(|(start, _, _)| *start);

    let mut seen = HashSet::new();
    let mut stops = Vec::new();

    for (_, city, state) in mentions {
        if seen.insert((city.to_lowercase(), state.clone())) {
            stops.push(ItineraryStop {
                date: None,
                city: Some(city),
                state: Some(state),
            });
        }
    }

    stops
}
