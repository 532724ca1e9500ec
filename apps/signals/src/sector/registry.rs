use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::errors::EngineError;
use crate::sector::config::SectorConfig;
use crate::sector::document::SectorDocument;
use crate::sector::source::{SectorSource, StaticSource};

/// Outcome of loading one sector during `load_all`.
#[derive(Debug)]
pub struct SectorLoadOutcome {
    pub sector_id: String,
    pub result: Result<Arc<SectorConfig>, EngineError>,
}

/// Holds every loaded sector configuration.
///
/// Configs are swapped in whole; readers holding an `Arc<SectorConfig>` keep
/// the version they resolved even if a reload happens mid-analysis.
pub struct SectorRegistry {
    source: Arc<dyn SectorSource>,
    sectors: RwLock<HashMap<String, Arc<SectorConfig>>>,
}

impl SectorRegistry {
    pub fn new(source: Arc<dyn SectorSource>) -> Self {
        Self {
            source,
            sectors: RwLock::new(HashMap::new()),
        }
    }

    /// Registry with no backing documents; sectors arrive through `install`.
    pub fn detached() -> Self {
        Self::new(Arc::new(StaticSource::default()))
    }

    /// Fetches, validates, and installs one sector. A failure leaves any
    /// previously installed version of that sector in place.
    pub async fn load(&self, sector_id: &str) -> Result<Arc<SectorConfig>, EngineError> {
        let doc = self.source.fetch(sector_id).await?;
        self.install(doc)
    }

    /// Loads every sector the source lists. Per-sector failures are reported,
    /// not propagated; only a failure to list the source is an error.
    pub async fn load_all(&self) -> Result<Vec<SectorLoadOutcome>, EngineError> {
        let ids = self.source.sector_ids().await?;
        let mut outcomes = Vec::with_capacity(ids.len());
        for sector_id in ids {
            let result = self.load(&sector_id).await;
            if let Err(e) = &result {
                warn!("Sector '{sector_id}' failed to load: {e}");
            }
            outcomes.push(SectorLoadOutcome { sector_id, result });
        }
        Ok(outcomes)
    }

    /// Validates and installs a document directly.
    pub fn install(&self, doc: SectorDocument) -> Result<Arc<SectorConfig>, EngineError> {
        let config = Arc::new(SectorConfig::compile(doc)?);
        let replaced = self
            .sectors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(config.id.clone(), Arc::clone(&config))
            .is_some();

        info!(
            "{} sector '{}' ({} keywords, {} seniority rules)",
            if replaced { "Reloaded" } else { "Loaded" },
            config.id,
            config.keyword_patterns.len(),
            config.seniority_rules.len()
        );
        Ok(config)
    }

    pub fn get(&self, sector_id: &str) -> Result<Arc<SectorConfig>, EngineError> {
        self.sectors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(sector_id)
            .cloned()
            .ok_or_else(|| EngineError::sector_not_found(sector_id))
    }

    pub fn sector_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sectors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}
