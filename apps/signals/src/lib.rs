//! Sector-aware keyword extraction, market aggregation and career recommendations
//! for job postings.
//!
//! Postings flow one way: text → [`AnalysisResult`] → per-sector statistics →
//! [`Recommendation`]s.

pub mod aggregation;
pub mod analysis;
pub mod config;
pub mod errors;
pub mod models;
pub mod recommendation;
pub mod sector;

pub use aggregation::{AggregationEngine, AggregationSettings};
pub use analysis::{BatchReport, ExtractionSettings, KeywordExtractor, OfferAnalyzer};
pub use errors::EngineError;
pub use models::analysis::{AnalysisResult, Category, KeywordMatch, RawPosting};
pub use models::market::{MarketSnapshot, SectorKeywordStat, SectorSnapshot};
pub use models::profile::UserProfile;
pub use recommendation::{Recommendation, RecommendationEngine, RecommendationKind};
pub use sector::{DirectorySource, SectorConfig, SectorRegistry};
