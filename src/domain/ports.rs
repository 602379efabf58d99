use crate::domain::model::{
    Dataset, Device, DeviceId, LoadSummary, RawDataset, TesterActivity,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Read access the matcher needs from whatever holds testers, devices and bugs.
///
/// Ownership and bug reports are exposed as separate associations keyed by
/// tester so the engine can intersect and count instead of walking a graph.
pub trait DomainStore: Send + Sync {
    /// All devices in store order.
    fn devices(&self) -> Result<Vec<Device>>;

    /// Every tester in store order with their current ownership and the
    /// devices of every bug they filed, taken from one consistent state.
    fn tester_activity(&self) -> Result<Vec<TesterActivity>>;

    /// The subset of `ids` that exist in the store.
    fn existing_devices(&self, ids: &BTreeSet<DeviceId>) -> Result<BTreeSet<DeviceId>>;
}

/// Destination for a freshly parsed dataset.
pub trait DatasetSink: Send + Sync {
    fn import(&self, dataset: Dataset) -> Result<LoadSummary>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait DatasetProvider: Send + Sync {
    fn devices_file(&self) -> &str;
    fn testers_file(&self) -> &str;
    fn bugs_file(&self) -> &str;
    fn ownership_file(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawDataset>;
    async fn transform(&self, raw: RawDataset) -> Result<Dataset>;
    async fn load(&self, dataset: Dataset) -> Result<LoadSummary>;
}
