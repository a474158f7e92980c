//! Merging and field validation of TAR data.

use rust_decimal::Decimal;
use tracing::debug;

use crate::extract::patterns::{PHONE_FORMAT, VENDOR_CODE_FORMAT};
use crate::models::tar::{ExtractedRecord, MergedTarData, TarInput};

/// Merge extracted and manual data into one canonical record.
///
/// Manual input wins field-by-field. Alias fields (`traveler`, `purpose`,
/// `poc`) fill their canonical counterpart only when it is absent, and the
/// duty station is derived from city/state (or split back into them) when
/// one side is missing.
pub fn merge(extracted: &ExtractedRecord, manual: &TarInput) -> MergedTarData {
    let mut data = MergedTarData {
        authorization_number: pick(&manual.authorization_number, &extracted.authorization_number),
        traveler_name: pick(&manual.traveler_name, &extracted.traveler_name),
        title: pick(&manual.title, &extracted.title),
        vendor_code: pick(&manual.vendor_code, &extracted.vendor_code),
        current_address: pick(&manual.current_address, &extracted.current_address),
        office_division: pick(&manual.office_division, &extracted.office_division),
        duty_station: pick(&manual.duty_station, &extracted.duty_station),
        city: manual.city.clone(),
        state: manual.state.clone(),
        contact_number: pick(&manual.contact_number, &extracted.contact_number),
        travel_purpose: pick(&manual.travel_purpose, &extracted.travel_purpose),
        brief_description: pick(&manual.brief_description, &extracted.brief_description),
        estimated_cost: manual.estimated_cost.or(extracted.estimated_cost),
        per_diem: manual.per_diem.or(extracted.per_diem),
        air_rail: manual.air_rail.or(extracted.air_rail),
        lodging: manual.lodging.or(extracted.lodging),
        rental_car: manual.rental_car.or(extracted.rental_car),
        miscellaneous: manual.miscellaneous.or(extracted.miscellaneous),
        departure_date: pick(&manual.departure_date, &extracted.departure_date),
        return_date: pick(&manual.return_date, &extracted.return_date),
        itinerary: if manual.itinerary.is_empty() {
            extracted.itinerary.clone()
        } else {
            manual.itinerary.clone()
        },
    };

    canonicalize(&mut data, manual);
    debug!(
        traveler = data.traveler_name.as_deref().unwrap_or("<unknown>"),
        stops = data.itinerary.len(),
        "merge complete"
    );
    data
}

/// Resolve aliases and derive duty station / city / state, in either
/// direction. Aliases never overwrite a canonical value that is present.
fn canonicalize(data: &mut MergedTarData, manual: &TarInput) {
    if data.traveler_name.is_none() {
        data.traveler_name = manual.traveler.clone();
    }
    if data.travel_purpose.is_none() {
        data.travel_purpose = manual.purpose.clone();
    }
    if data.contact_number.is_none() {
        data.contact_number = manual.poc.clone();
    }

    if data.duty_station.is_none() {
        if let (Some(city), Some(state)) = (&data.city, &data.state) {
            data.duty_station = Some(format!("{}, {}", city, state));
        }
    }

    // A "City, ST" duty station fills in city and state when the caller
    // did not supply them.
    if data.city.is_none() || data.state.is_none() {
        if let Some((city, rest)) = data
            .duty_station
            .as_deref()
            .and_then(|s| s.split_once(','))
        {
            if data.city.is_none() {
                data.city = Some(city.trim().to_string());
            }
            if data.state.is_none() {
                let state: String = rest.trim().chars().take(2).collect();
                if !state.is_empty() {
                    data.state = Some(state.to_uppercase());
                }
            }
        }
    }
}

fn pick(manual: &Option<String>, extracted: &Option<String>) -> Option<String> {
    manual
        .as_ref()
        .filter(|v| !v.trim().is_empty())
        .or(extracted.as_ref())
        .cloned()
}

/// Check required fields and conditional formats. Returns one message per
/// violation; an empty list means the record passed.
pub fn check(data: &MergedTarData) -> Vec<String> {
    let mut errors = Vec::new();

    let required = [
        ("travelerName", data.traveler_name.as_deref()),
        ("travelPurpose", data.travel_purpose.as_deref()),
        ("dutyStation", data.duty_station.as_deref()),
        ("contactNumber", data.contact_number.as_deref()),
    ];
    for (name, value) in required {
        if value.map_or(true, |v| v.trim().is_empty()) {
            errors.push(format!("Missing required field: {}", name));
        }
    }

    match data.estimated_cost {
        None => errors.push("Missing required field: estimatedCost".to_string()),
        Some(cost) if cost <= Decimal::ZERO => {
            errors.push("estimatedCost must be greater than zero".to_string());
        }
        Some(_) => {}
    }

    // Format checks apply only when the field is present.
    if let Some(code) = data.vendor_code.as_deref() {
        if !VENDOR_CODE_FORMAT.is_match(code) {
            errors.push(format!("vendorCode '{}' is not a valid vendor code", code));
        }
    }

    if let Some(phone) = data.contact_number.as_deref() {
        let digits: String = phone
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();
        if !PHONE_FORMAT.is_match(&digits) {
            errors.push(format!(
                "contactNumber '{}' is not a valid phone number",
                phone
            ));
        }
    }

    errors
}
