use crate::core::Pipeline;
use crate::domain::model::LoadSummary;
use crate::utils::error::Result;
use std::time::Instant;

/// Drives a dataset pipeline through extract, transform and load.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<LoadSummary> {
        let started = Instant::now();
        tracing::info!("Loading dataset...");

        // Extract
        let raw = self.pipeline.extract().await?;
        tracing::debug!(
            "Extracted {} bytes",
            raw.devices.len() + raw.testers.len() + raw.bugs.len() + raw.ownership.len()
        );

        // Transform
        let dataset = self.pipeline.transform(raw).await?;
        tracing::debug!(
            "Parsed {} devices, {} testers, {} bugs, {} ownership rows",
            dataset.devices.len(),
            dataset.testers.len(),
            dataset.bugs.len(),
            dataset.ownership.len()
        );

        // Load
        let summary = self.pipeline.load(dataset).await?;
        tracing::info!(
            "Dataset loaded in {:?}: {} devices, {} testers, {} bugs, {} device tester relations",
            started.elapsed(),
            summary.devices,
            summary.testers,
            summary.bugs,
            summary.ownership
        );

        Ok(summary)
    }
}
