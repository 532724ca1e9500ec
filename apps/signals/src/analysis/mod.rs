// Posting analysis: keyword extraction, seniority, side signals, orchestration.
// Everything here is pure over (text, SectorConfig) and safe to run in parallel.

pub mod analyzer;
pub mod extractor;
pub mod seniority;
pub mod signals;
pub(crate) mod text;

pub use analyzer::{BatchReport, OfferAnalyzer, OfferFailure};
pub use extractor::{ExtractionSettings, KeywordExtractor};
pub use seniority::{SeniorityAssessment, SeniorityClassifier};
