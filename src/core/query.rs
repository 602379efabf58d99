use std::collections::BTreeSet;

pub const COUNTRIES_PARAM: &str = "countries";
pub const DEVICES_PARAM: &str = "devices";

/// Filter values as the caller sent them, merged into one set per parameter.
///
/// Both `?countries=US&countries=GB` and `?countries=US,GB` end up as
/// `{"GB", "US"}`. Segments are kept verbatim: `?countries=` yields `{""}`
/// and `?countries=%20US` yields `{" US"}`, both of which the validator
/// rejects. Only an absent parameter means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRequest {
    pub countries: BTreeSet<String>,
    pub devices: BTreeSet<String>,
}

impl MatchRequest {
    pub fn new<C, D>(countries: C, devices: D) -> Self
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        let mut request = Self::default();
        for value in countries {
            request.push_countries(value.as_ref());
        }
        for value in devices {
            request.push_devices(value.as_ref());
        }
        request
    }

    /// Parses a raw URL query string. Unrelated parameters are ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut request = Self::default();
        let Some(query) = query else {
            return request;
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                COUNTRIES_PARAM => request.push_countries(&value),
                DEVICES_PARAM => request.push_devices(&value),
                _ => {}
            }
        }
        request
    }

    pub fn push_countries(&mut self, raw: &str) {
        self.countries.extend(split_values(raw));
    }

    pub fn push_devices(&mut self, raw: &str) {
        self.devices.extend(split_values(raw));
    }
}

fn split_values(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',').map(str::to_string)
}
