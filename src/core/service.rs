use crate::core::experience::{ExperienceEngine, MatchFilter};
use crate::core::query::MatchRequest;
use crate::core::validator::{validate_countries, validate_devices};
use crate::domain::model::{Device, TesterExperience};
use crate::domain::ports::DomainStore;
use crate::utils::error::Result;
use std::sync::Arc;

/// Entry point used by the HTTP layer and the CLI.
pub struct MatchService<S: DomainStore> {
    store: Arc<S>,
    engine: ExperienceEngine<S>,
}

impl<S: DomainStore> MatchService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            engine: ExperienceEngine::new(store.clone()),
            store,
        }
    }

    /// Countries are checked before devices; the engine only runs when both pass.
    pub fn resolve_filter(&self, request: &MatchRequest) -> Result<MatchFilter> {
        let countries = validate_countries(&request.countries).inspect_err(|e| {
            tracing::warn!("rejected countries filter: {}", e);
        })?;
        let devices = validate_devices(self.store.as_ref(), &request.devices).inspect_err(|e| {
            tracing::warn!("rejected devices filter: {}", e);
        })?;
        Ok(MatchFilter { countries, devices })
    }

    pub fn match_testers(&self, request: &MatchRequest) -> Result<Vec<TesterExperience>> {
        let filter = self.resolve_filter(request)?;
        let ranked = self.engine.rank(&filter)?;
        tracing::debug!(results = ranked.len(), "match-testers computed");
        Ok(ranked)
    }

    pub fn list_devices(&self) -> Result<Vec<Device>> {
        self.store.devices()
    }
}
