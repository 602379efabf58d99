use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TesterId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BugId(pub u64);

macro_rules! id_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $ty {
                type Err = std::num::ParseIntError;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    s.parse().map(Self)
                }
            }
        )*
    };
}

id_display!(DeviceId, TesterId, BugId);

/// Countries a tester may be registered in. Codes are matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "GB")]
    Gb,
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "JP")]
    Jp,
}

impl Country {
    pub const ALL: [Country; 3] = [Country::Gb, Country::Us, Country::Jp];

    pub fn code(&self) -> &'static str {
        match self {
            Country::Gb => "GB",
            Country::Us => "US",
            Country::Jp => "JP",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedCountry(pub String);

impl FromStr for Country {
    type Err = UnsupportedCountry;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Country::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| UnsupportedCountry(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub description: String,
}

/// A tester record. Owned devices are not embedded here; the store keeps
/// ownership as a separate association so it can change without touching
/// the tester row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tester {
    pub id: TesterId,
    pub first_name: String,
    pub last_name: String,
    pub country: Country,
    pub last_login: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bug {
    pub id: BugId,
    pub device: DeviceId,
    pub tester: TesterId,
}

/// Raw bytes of the four dataset files, as read from storage.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub devices: Vec<u8>,
    pub testers: Vec<u8>,
    pub bugs: Vec<u8>,
    pub ownership: Vec<u8>,
}

/// Typed records ready to be imported into a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub devices: Vec<Device>,
    pub testers: Vec<Tester>,
    pub bugs: Vec<Bug>,
    pub ownership: Vec<(TesterId, DeviceId)>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub devices: usize,
    pub testers: usize,
    pub bugs: usize,
    pub ownership: usize,
}

/// A tester together with what they own and which devices their bugs were
/// filed against, all read from the same store state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesterActivity {
    pub tester: Tester,
    pub owned: BTreeSet<DeviceId>,
    pub reported: Vec<DeviceId>,
}

/// One row of the ranking. Field order matches the response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TesterExperience {
    #[serde(skip_serializing)]
    pub tester_id: TesterId,
    pub experience: u64,
    pub first_name: String,
    pub last_name: String,
    pub country: Country,
}
