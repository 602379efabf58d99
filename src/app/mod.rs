pub mod pipelines;

use crate::adapters::InMemoryStore;
use crate::config::cli::LocalStorage;
use crate::config::toml_config::DatasetConfig;
use crate::core::etl::EtlEngine;
use crate::utils::error::Result;
use pipelines::CsvDatasetPipeline;
use std::sync::Arc;

/// Builds an in-memory store from the CSV files under `dataset.dir`.
pub async fn load_store(dataset: &DatasetConfig) -> Result<Arc<InMemoryStore>> {
    let store = Arc::new(InMemoryStore::new());
    let storage = LocalStorage::new(dataset.dir.clone());
    let pipeline = CsvDatasetPipeline::new(storage, dataset.clone(), store.clone());

    EtlEngine::new(pipeline).run().await?;
    Ok(store)
}
