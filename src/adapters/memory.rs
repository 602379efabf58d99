use crate::domain::model::{
    Bug, BugId, Dataset, Device, DeviceId, LoadSummary, Tester, TesterActivity, TesterId,
};
use crate::domain::ports::{DatasetSink, DomainStore};
use crate::utils::error::{MatchError, Result};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    devices: Vec<Device>,
    device_ids: BTreeSet<DeviceId>,
    testers: Vec<Tester>,
    tester_ids: BTreeSet<TesterId>,
    // tester -> devices currently owned
    ownership: BTreeMap<TesterId, BTreeSet<DeviceId>>,
    // tester -> bugs filed, in load order
    bugs_by_tester: BTreeMap<TesterId, Vec<Bug>>,
    bug_count: usize,
}

impl Tables {
    fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.testers.is_empty() && self.bug_count == 0
    }
}

/// In-memory store holding testers, devices, bug reports and the ownership
/// association. Reads take a shared lock; ownership changes take it exclusively.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| MatchError::StoreError {
            message: "store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| MatchError::StoreError {
            message: "store lock poisoned".to_string(),
        })
    }

    /// Records that `tester` now owns `device`. Returns false if it already did.
    pub fn assign_device(&self, tester: TesterId, device: DeviceId) -> Result<bool> {
        let mut tables = self.write()?;
        check_refs(&tables, tester, device, "ownership")?;

        let added = tables.ownership.entry(tester).or_default().insert(device);
        tracing::debug!(%tester, %device, added, "device assigned");
        Ok(added)
    }

    /// Records that `tester` no longer owns `device`. Bugs already filed
    /// against it stay in the store but stop counting towards experience.
    pub fn release_device(&self, tester: TesterId, device: DeviceId) -> Result<bool> {
        let mut tables = self.write()?;
        check_refs(&tables, tester, device, "ownership")?;

        let removed = tables
            .ownership
            .get_mut(&tester)
            .map(|owned| owned.remove(&device))
            .unwrap_or(false);
        tracing::debug!(%tester, %device, removed, "device released");
        Ok(removed)
    }
}

fn check_refs(tables: &Tables, tester: TesterId, device: DeviceId, what: &str) -> Result<()> {
    if !tables.tester_ids.contains(&tester) {
        return Err(MatchError::IntegrityError {
            message: format!("{} references missing tester {}", what, tester),
        });
    }
    if !tables.device_ids.contains(&device) {
        return Err(MatchError::IntegrityError {
            message: format!("{} references missing device {}", what, device),
        });
    }
    Ok(())
}

fn unique_ids<I, T>(ids: I, kind: &str) -> Result<BTreeSet<T>>
where
    I: IntoIterator<Item = T>,
    T: Ord + Copy + std::fmt::Display,
{
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(MatchError::IntegrityError {
                message: format!("duplicate {} id {}", kind, id),
            });
        }
    }
    Ok(seen)
}

impl DatasetSink for InMemoryStore {
    fn import(&self, dataset: Dataset) -> Result<LoadSummary> {
        let mut tables = self.write()?;
        if !tables.is_empty() {
            return Err(MatchError::StoreError {
                message: "device, tester and bug tables are not empty".to_string(),
            });
        }

        // Build everything aside so a rejected dataset leaves the store untouched.
        let mut staged = Tables {
            device_ids: unique_ids(dataset.devices.iter().map(|d| d.id), "device")?,
            tester_ids: unique_ids(dataset.testers.iter().map(|t| t.id), "tester")?,
            ..Tables::default()
        };
        unique_ids::<_, BugId>(dataset.bugs.iter().map(|b| b.id), "bug")?;

        for bug in &dataset.bugs {
            check_refs(&staged, bug.tester, bug.device, &format!("bug {}", bug.id))?;
            staged.bugs_by_tester.entry(bug.tester).or_default().push(*bug);
        }
        staged.bug_count = dataset.bugs.len();

        let mut pairs = HashSet::new();
        for &(tester, device) in &dataset.ownership {
            check_refs(&staged, tester, device, "ownership")?;
            pairs.insert((tester, device));
            staged.ownership.entry(tester).or_default().insert(device);
        }

        staged.devices = dataset.devices;
        staged.testers = dataset.testers;

        let summary = LoadSummary {
            devices: staged.devices.len(),
            testers: staged.testers.len(),
            bugs: staged.bug_count,
            ownership: pairs.len(),
        };
        *tables = staged;

        tracing::info!(
            devices = summary.devices,
            testers = summary.testers,
            bugs = summary.bugs,
            ownership = summary.ownership,
            "dataset imported"
        );
        Ok(summary)
    }
}

impl DomainStore for InMemoryStore {
    fn devices(&self) -> Result<Vec<Device>> {
        Ok(self.read()?.devices.clone())
    }

    fn tester_activity(&self) -> Result<Vec<TesterActivity>> {
        // one guard for the whole snapshot, so a concurrent release cannot
        // split a tester's ownership from their bug history
        let tables = self.read()?;
        Ok(tables
            .testers
            .iter()
            .map(|tester| TesterActivity {
                tester: tester.clone(),
                owned: tables.ownership.get(&tester.id).cloned().unwrap_or_default(),
                reported: tables
                    .bugs_by_tester
                    .get(&tester.id)
                    .map(|bugs| bugs.iter().map(|bug| bug.device).collect())
                    .unwrap_or_default(),
            })
            .collect())
    }

    fn existing_devices(&self, ids: &BTreeSet<DeviceId>) -> Result<BTreeSet<DeviceId>> {
        let tables = self.read()?;
        Ok(ids.intersection(&tables.device_ids).copied().collect())
    }
}
