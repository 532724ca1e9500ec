use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::aggregation::AggregationSettings;
use crate::recommendation::{RecommendationSettings, DEFAULT_MAX_RESULTS};

/// Runner configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub sectors_dir: PathBuf,
    pub postings_path: Option<PathBuf>,
    pub profile_path: Option<PathBuf>,
    pub trend_alpha: f64,
    pub trend_bucket_hours: u64,
    pub snapshot_timeout_ms: u64,
    pub retire_after_buckets: Option<u32>,
    pub analysis_workers: usize,
    pub max_recommendations: usize,
    pub emerging_multiplier: f64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            sectors_dir: require_env("SECTORS_DIR")?.into(),
            postings_path: std::env::var("POSTINGS_PATH").ok().map(PathBuf::from),
            profile_path: std::env::var("PROFILE_PATH").ok().map(PathBuf::from),
            trend_alpha: parse_env("TREND_ALPHA", 0.3)?,
            trend_bucket_hours: parse_env("TREND_BUCKET_HOURS", 24)?,
            snapshot_timeout_ms: parse_env("SNAPSHOT_TIMEOUT_MS", 250)?,
            retire_after_buckets: optional_env("RETIRE_AFTER_BUCKETS")?,
            analysis_workers: parse_env(
                "ANALYSIS_WORKERS",
                std::thread::available_parallelism().map_or(4, |n| n.get()),
            )?,
            max_recommendations: parse_env("MAX_RECOMMENDATIONS", DEFAULT_MAX_RESULTS)?,
            emerging_multiplier: parse_env("EMERGING_MULTIPLIER", 1.5)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };

        anyhow::ensure!(
            config.trend_alpha > 0.0 && config.trend_alpha <= 1.0,
            "TREND_ALPHA must be in (0, 1], got {}",
            config.trend_alpha
        );
        anyhow::ensure!(config.trend_bucket_hours > 0, "TREND_BUCKET_HOURS must be positive");
        Ok(config)
    }

    pub fn aggregation_settings(&self) -> AggregationSettings {
        AggregationSettings {
            alpha: self.trend_alpha,
            bucket_width: Duration::from_secs(self.trend_bucket_hours * 60 * 60),
            snapshot_timeout: Duration::from_millis(self.snapshot_timeout_ms),
            retire_after_buckets: self.retire_after_buckets,
        }
    }

    pub fn recommendation_settings(&self) -> RecommendationSettings {
        RecommendationSettings {
            emerging_multiplier: self.emerging_multiplier,
            ..RecommendationSettings::default()
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(optional_env(key)?.unwrap_or(default))
}

fn optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(None),
    }
}
