//! Sector Sources: pluggable suppliers of raw sector documents.
//!
//! The registry holds an `Arc<dyn SectorSource>`; swapping where configuration
//! comes from never touches the registry or anything downstream of it.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::EngineError;
use crate::sector::document::SectorDocument;

#[async_trait]
pub trait SectorSource: Send + Sync {
    /// Returns the raw document for one sector.
    async fn fetch(&self, sector_id: &str) -> Result<SectorDocument, EngineError>;

    /// Lists every sector id this source can supply, sorted.
    async fn sector_ids(&self) -> Result<Vec<String>, EngineError>;
}

// ────────────────────────────────────────────────────────────────────────────
// DirectorySource: one `<sector_id>.json` per sector
// ────────────────────────────────────────────────────────────────────────────

pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, sector_id: &str) -> Option<PathBuf> {
        let valid = !sector_id.is_empty()
            && sector_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.root.join(format!("{sector_id}.json")))
    }
}

#[async_trait]
impl SectorSource for DirectorySource {
    async fn fetch(&self, sector_id: &str) -> Result<SectorDocument, EngineError> {
        let path = self
            .document_path(sector_id)
            .ok_or_else(|| EngineError::sector_not_found(sector_id))?;

        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                EngineError::sector_not_found(sector_id)
            } else {
                EngineError::Source(format!("failed to read {}: {e}", path.display()))
            }
        })?;
        debug!("Read sector document {}", path.display());

        let doc: SectorDocument = serde_json::from_str(&raw).map_err(|e| {
            EngineError::config(sector_id, format!("unparsable sector document: {e}"))
        })?;

        if doc.id.trim() != sector_id {
            return Err(EngineError::config(
                sector_id,
                format!("document declares id '{}'", doc.id),
            ));
        }
        Ok(doc)
    }

    async fn sector_ids(&self) -> Result<Vec<String>, EngineError> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            EngineError::Source(format!("failed to list {}: {e}", self.root.display()))
        })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| EngineError::Source(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// StaticSource: documents held in memory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StaticSource {
    documents: BTreeMap<String, SectorDocument>,
}

impl StaticSource {
    pub fn new(documents: impl IntoIterator<Item = SectorDocument>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|d| (d.id.trim().to_string(), d))
                .collect(),
        }
    }
}

#[async_trait]
impl SectorSource for StaticSource {
    async fn fetch(&self, sector_id: &str) -> Result<SectorDocument, EngineError> {
        self.documents
            .get(sector_id)
            .cloned()
            .ok_or_else(|| EngineError::sector_not_found(sector_id))
    }

    async fn sector_ids(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.documents.keys().cloned().collect())
    }
}
