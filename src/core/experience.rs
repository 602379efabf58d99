use crate::domain::model::{Country, DeviceId, Tester, TesterActivity, TesterExperience};
use crate::domain::ports::DomainStore;
use crate::utils::error::Result;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Validated filters. An empty set means no restriction on that axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFilter {
    pub countries: BTreeSet<Country>,
    pub devices: BTreeSet<DeviceId>,
}

impl MatchFilter {
    pub fn admits(&self, tester: &Tester) -> bool {
        self.countries.is_empty() || self.countries.contains(&tester.country)
    }

    /// Devices whose bugs count for a tester owning `owned`.
    pub fn countable(&self, owned: BTreeSet<DeviceId>) -> BTreeSet<DeviceId> {
        if self.devices.is_empty() {
            owned
        } else {
            owned.intersection(&self.devices).copied().collect()
        }
    }
}

/// Ranks testers by experience: bugs they filed against devices they own
/// now, optionally narrowed to a requested device set.
///
/// Stateless over the store. Every ranking works from one snapshot of the
/// current ownership, so a device handed back stops counting on the next query.
pub struct ExperienceEngine<S: DomainStore> {
    store: Arc<S>,
}

impl<S: DomainStore> ExperienceEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Every tester admitted by the country filter, zero-experience ones
    /// included, ordered by experience desc then last name, first name and id.
    pub fn rank(&self, filter: &MatchFilter) -> Result<Vec<TesterExperience>> {
        let candidates: Vec<TesterActivity> = self
            .store
            .tester_activity()?
            .into_iter()
            .filter(|a| filter.admits(&a.tester))
            .collect();

        tracing::debug!(
            candidates = candidates.len(),
            countries = filter.countries.len(),
            devices = filter.devices.len(),
            "ranking testers"
        );

        let mut ranked = Vec::with_capacity(candidates.len());
        for activity in candidates {
            let experience = experience_of(&activity, filter);
            let tester = activity.tester;
            ranked.push(TesterExperience {
                tester_id: tester.id,
                experience,
                first_name: tester.first_name,
                last_name: tester.last_name,
                country: tester.country,
            });
        }

        ranked.sort_by(ranking_order);
        Ok(ranked)
    }
}

/// Bugs the tester filed against devices in their countable set.
pub fn experience_of(activity: &TesterActivity, filter: &MatchFilter) -> u64 {
    let countable = filter.countable(activity.owned.clone());
    if countable.is_empty() {
        return 0;
    }
    activity
        .reported
        .iter()
        .filter(|device| countable.contains(device))
        .count() as u64
}

pub fn ranking_order(a: &TesterExperience, b: &TesterExperience) -> Ordering {
    b.experience
        .cmp(&a.experience)
        .then_with(|| a.last_name.cmp(&b.last_name))
        .then_with(|| a.first_name.cmp(&b.first_name))
        .then_with(|| a.tester_id.cmp(&b.tester_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::model::{Bug, BugId, Dataset, Device, TesterId};
    use crate::domain::ports::DatasetSink;
    use chrono::{TimeZone, Utc};

    const IPHONE: DeviceId = DeviceId(1);
    const NOKIA: DeviceId = DeviceId(2);
    const ANDROID: DeviceId = DeviceId(3);

    struct Fixture {
        dataset: Dataset,
        next_bug: u64,
    }

    impl Fixture {
        fn new() -> Self {
            let devices = [(IPHONE, "iPhone 4"), (NOKIA, "Nokia 3310"), (ANDROID, "Galaxy S4")]
                .into_iter()
                .map(|(id, description)| Device {
                    id,
                    description: description.to_string(),
                })
                .collect();
            Self {
                dataset: Dataset {
                    devices,
                    ..Dataset::default()
                },
                next_bug: 1,
            }
        }

        fn tester(
            mut self,
            id: u64,
            name: (&str, &str),
            country: Country,
            owns: &[DeviceId],
            bugs: &[(DeviceId, usize)],
        ) -> Self {
            let tester = TesterId(id);
            self.dataset.testers.push(Tester {
                id: tester,
                first_name: name.0.to_string(),
                last_name: name.1.to_string(),
                country,
                last_login: Utc.with_ymd_and_hms(2013, 8, 4, 23, 57, 38).unwrap(),
            });
            for device in owns {
                self.dataset.ownership.push((tester, *device));
            }
            for (device, count) in bugs {
                for _ in 0..*count {
                    self.dataset.bugs.push(Bug {
                        id: BugId(self.next_bug),
                        device: *device,
                        tester,
                    });
                    self.next_bug += 1;
                }
            }
            self
        }

        fn engine(self) -> (Arc<InMemoryStore>, ExperienceEngine<InMemoryStore>) {
            let store = Arc::new(InMemoryStore::new());
            store.import(self.dataset).unwrap();
            (store.clone(), ExperienceEngine::new(store))
        }
    }

    fn reference() -> Fixture {
        Fixture::new()
            .tester(1, ("John", "Doe"), Country::Us, &[NOKIA, ANDROID], &[(IPHONE, 3)])
            .tester(2, ("Bob", "Brown"), Country::Gb, &[IPHONE], &[(IPHONE, 2), (NOKIA, 1)])
            .tester(
                3,
                ("Kate", "Kowalski"),
                Country::Us,
                &[IPHONE, NOKIA, ANDROID],
                &[(IPHONE, 1), (NOKIA, 1), (ANDROID, 1)],
            )
            .tester(
                4,
                ("Sara", "Smith"),
                Country::Us,
                &[NOKIA, ANDROID],
                &[(NOKIA, 2), (ANDROID, 2)],
            )
            .tester(
                5,
                ("Michael", "Tanaka"),
                Country::Jp,
                &[IPHONE, ANDROID],
                &[(IPHONE, 2), (ANDROID, 3)],
            )
            .tester(6, ("Lee", "Wong"), Country::Us, &[NOKIA], &[(NOKIA, 7)])
    }

    fn summary(ranked: &[TesterExperience]) -> Vec<(&str, u64)> {
        ranked
            .iter()
            .map(|r| (r.first_name.as_str(), r.experience))
            .collect()
    }

    #[test]
    fn test_unfiltered_ranking() {
        let (_, engine) = reference().engine();
        let ranked = engine.rank(&MatchFilter::default()).unwrap();

        assert_eq!(
            summary(&ranked),
            vec![
                ("Lee", 7),
                ("Michael", 5),
                ("Sara", 4),
                ("Kate", 3),
                ("Bob", 2),
                ("John", 0)
            ]
        );
    }

    #[test]
    fn test_country_filter_drops_other_countries_only() {
        let (_, engine) = reference().engine();
        let filter = MatchFilter {
            countries: BTreeSet::from([Country::Us, Country::Gb]),
            ..MatchFilter::default()
        };

        assert_eq!(
            summary(&engine.rank(&filter).unwrap()),
            vec![("Lee", 7), ("Sara", 4), ("Kate", 3), ("Bob", 2), ("John", 0)]
        );
    }

    #[test]
    fn test_device_filter_intersects_ownership() {
        let (_, engine) = reference().engine();
        let filter = MatchFilter {
            devices: BTreeSet::from([ANDROID, IPHONE]),
            ..MatchFilter::default()
        };

        let ranked = engine.rank(&filter).unwrap();
        assert_eq!(
            summary(&ranked),
            vec![
                ("Michael", 5),
                ("Bob", 2),
                ("Kate", 2),
                ("Sara", 2),
                ("John", 0),
                ("Lee", 0)
            ]
        );
    }

    #[test]
    fn test_filters_compose() {
        let (_, engine) = reference().engine();
        let filter = MatchFilter {
            countries: BTreeSet::from([Country::Us]),
            devices: BTreeSet::from([NOKIA]),
        };

        assert_eq!(
            summary(&engine.rank(&filter).unwrap()),
            vec![("Lee", 7), ("Sara", 2), ("Kate", 1), ("John", 0)]
        );
    }

    #[test]
    fn test_bugs_on_released_devices_stop_counting() {
        let (store, engine) = reference().engine();
        store.release_device(TesterId(6), NOKIA).unwrap();
        store.assign_device(TesterId(1), IPHONE).unwrap();

        let ranked = engine.rank(&MatchFilter::default()).unwrap();
        assert_eq!(ranked[0].first_name, "Michael");
        let lee = ranked.iter().find(|r| r.first_name == "Lee").unwrap();
        assert_eq!(lee.experience, 0);
        let john = ranked.iter().find(|r| r.first_name == "John").unwrap();
        assert_eq!(john.experience, 3);
    }

    #[test]
    fn test_tester_without_devices_has_zero_experience() {
        let (_, engine) = Fixture::new()
            .tester(1, ("Ann", "Lee"), Country::Gb, &[], &[(IPHONE, 4)])
            .engine();

        let ranked = engine.rank(&MatchFilter::default()).unwrap();
        assert_eq!(summary(&ranked), vec![("Ann", 0)]);
    }

    #[test]
    fn test_full_name_ties_break_on_id() {
        let (_, engine) = Fixture::new()
            .tester(9, ("Sam", "Hill"), Country::Gb, &[], &[])
            .tester(3, ("Sam", "Hill"), Country::Us, &[], &[])
            .tester(5, ("Al", "Hill"), Country::Jp, &[], &[])
            .engine();

        let ids: Vec<TesterId> = engine
            .rank(&MatchFilter::default())
            .unwrap()
            .iter()
            .map(|r| r.tester_id)
            .collect();
        assert_eq!(ids, vec![TesterId(5), TesterId(3), TesterId(9)]);
    }

    #[test]
    fn test_ranking_is_sorted() {
        let (_, engine) = reference().engine();
        let filters = [
            MatchFilter::default(),
            MatchFilter {
                devices: BTreeSet::from([NOKIA, ANDROID]),
                ..MatchFilter::default()
            },
            MatchFilter {
                countries: BTreeSet::from([Country::Jp, Country::Gb]),
                devices: BTreeSet::from([IPHONE]),
            },
        ];

        for filter in &filters {
            let ranked = engine.rank(filter).unwrap();
            for pair in ranked.windows(2) {
                assert_ne!(ranking_order(&pair[0], &pair[1]), Ordering::Greater);
            }
        }
    }

    #[test]
    fn test_experience_counts_only_owned_requested_devices() {
        let activity = TesterActivity {
            tester: Tester {
                id: TesterId(1),
                first_name: "Kate".to_string(),
                last_name: "Kowalski".to_string(),
                country: Country::Us,
                last_login: Utc.with_ymd_and_hms(2013, 8, 4, 23, 57, 38).unwrap(),
            },
            owned: BTreeSet::from([IPHONE, NOKIA]),
            reported: vec![IPHONE, IPHONE, NOKIA, ANDROID],
        };

        assert_eq!(experience_of(&activity, &MatchFilter::default()), 3);
        let requested = MatchFilter {
            devices: BTreeSet::from([NOKIA, ANDROID]),
            ..MatchFilter::default()
        };
        assert_eq!(experience_of(&activity, &requested), 1);
        let unowned = MatchFilter {
            devices: BTreeSet::from([ANDROID]),
            ..MatchFilter::default()
        };
        assert_eq!(experience_of(&activity, &unowned), 0);
    }

    #[test]
    fn test_empty_store() {
        let (_, engine) = Fixture::new().engine();
        assert!(engine.rank(&MatchFilter::default()).unwrap().is_empty());
    }
}
