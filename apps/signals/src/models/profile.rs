use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// A user's declared position in the market. Read-only to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub primary_sector_id: String,
    #[serde(default)]
    pub current_skills: BTreeSet<String>,
    #[serde(default)]
    pub target_sector_ids: BTreeSet<String>,
}

impl UserProfile {
    pub fn new(primary_sector_id: impl Into<String>) -> Self {
        Self {
            primary_sector_id: primary_sector_id.into(),
            ..Default::default()
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_sector_ids = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Rejects malformed profiles before any scoring runs.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.primary_sector_id.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "profile is missing primary_sector_id".to_string(),
            ));
        }
        if self.current_skills.iter().any(|s| s.trim().is_empty()) {
            return Err(EngineError::InvalidInput(
                "profile contains a blank skill".to_string(),
            ));
        }
        if self.target_sector_ids.iter().any(|s| s.trim().is_empty()) {
            return Err(EngineError::InvalidInput(
                "profile contains a blank target sector id".to_string(),
            ));
        }
        Ok(())
    }

    /// Lowercased skill set used for case-insensitive comparison.
    pub fn normalized_skills(&self) -> BTreeSet<String> {
        self.current_skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect()
    }
}
