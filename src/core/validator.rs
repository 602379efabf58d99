use crate::domain::model::{Country, DeviceId};
use crate::domain::ports::DomainStore;
use crate::utils::error::{MatchError, Result};
use std::collections::BTreeSet;

/// Checks every requested code against the supported countries.
///
/// An empty request is valid and means no country restriction. Stops at the
/// first unsupported code.
pub fn validate_countries(requested: &BTreeSet<String>) -> Result<BTreeSet<Country>> {
    let mut countries = BTreeSet::new();
    for code in requested {
        let country = code
            .parse::<Country>()
            .map_err(|e| MatchError::InvalidCountry { code: e.0 })?;
        countries.insert(country);
    }
    Ok(countries)
}

/// Checks that every requested identifier names a device in the store.
///
/// The request passes only if the number of distinct stored devices it
/// resolves to equals the number of values requested, so two spellings of
/// the same id (`1` and `01`) cannot stand in for two devices.
pub fn validate_devices<S>(store: &S, requested: &BTreeSet<String>) -> Result<BTreeSet<DeviceId>>
where
    S: DomainStore + ?Sized,
{
    if requested.is_empty() {
        return Ok(BTreeSet::new());
    }

    let mut parsed = Vec::with_capacity(requested.len());
    let mut invalid = Vec::new();
    for raw in requested {
        match raw.parse::<DeviceId>() {
            Ok(id) => parsed.push((raw, id)),
            Err(_) => invalid.push(raw.clone()),
        }
    }

    let wanted: BTreeSet<DeviceId> = parsed.iter().map(|(_, id)| *id).collect();
    let existing = store.existing_devices(&wanted)?;

    if existing.len() < requested.len() {
        let mut claimed = BTreeSet::new();
        for (raw, id) in parsed {
            // unknown ids, and every alias after the first for a known id
            if !existing.contains(&id) || !claimed.insert(id) {
                invalid.push(raw.clone());
            }
        }
        invalid.sort();
        return Err(MatchError::InvalidDevice { ids: invalid });
    }

    Ok(existing)
}
