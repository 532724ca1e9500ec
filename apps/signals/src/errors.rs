use thiserror::Error;

/// Engine-level error type.
///
/// `Config` and `NotFound` are fatal to a single sector or offer, never to a batch.
/// `InvalidInput` is raised before any recommendation work starts.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error in sector '{sector_id}': {reason}")]
    Config { sector_id: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Sector source error: {0}")]
    Source(String),
}

impl EngineError {
    pub fn config(sector_id: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::Config {
            sector_id: sector_id.into(),
            reason: reason.into(),
        }
    }

    pub fn sector_not_found(sector_id: &str) -> Self {
        EngineError::NotFound(format!("sector '{sector_id}' has no loaded configuration"))
    }

    /// Stable machine-readable code, used when failures are reported in batch output.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Config { .. } => "CONFIG_ERROR",
            EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::InvalidInput(_) => "INVALID_INPUT",
            EngineError::Source(_) => "SOURCE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message_names_sector() {
        let err = EngineError::config("tech", "duplicate keyword 'Python'");
        assert_eq!(
            err.to_string(),
            "Configuration error in sector 'tech': duplicate keyword 'Python'"
        );
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_sector_not_found_message() {
        let err = EngineError::sector_not_found("legal");
        assert!(err.to_string().contains("'legal'"));
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
