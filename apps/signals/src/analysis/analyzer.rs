//! Offer Analyzer: one posting in, one `AnalysisResult` out.
//!
//! `analyze` is pure apart from resolving the sector config. `analyze_batch`
//! fans postings out over the blocking pool; a failing offer is recorded and
//! skipped, never allowed to abort the rest of the batch.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::extractor::{ExtractionSettings, KeywordExtractor};
use crate::analysis::seniority::SeniorityClassifier;
use crate::analysis::signals::compute_signals;
use crate::errors::EngineError;
use crate::models::analysis::{AnalysisResult, RawPosting};
use crate::sector::SectorRegistry;

/// A posting that could not be analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferFailure {
    pub offer_id: String,
    pub sector_id: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    /// Successful results, in input order.
    pub results: Vec<AnalysisResult>,
    pub failures: Vec<OfferFailure>,
}

pub struct OfferAnalyzer {
    registry: Arc<SectorRegistry>,
    extractor: KeywordExtractor,
    classifier: SeniorityClassifier,
    workers: usize,
}

impl OfferAnalyzer {
    pub fn new(registry: Arc<SectorRegistry>) -> Self {
        Self {
            registry,
            extractor: KeywordExtractor::default(),
            classifier: SeniorityClassifier,
            workers: std::thread::available_parallelism().map_or(4, |n| n.get()),
        }
    }

    pub fn with_extraction_settings(mut self, settings: ExtractionSettings) -> Self {
        self.extractor = KeywordExtractor::new(settings);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn registry(&self) -> &Arc<SectorRegistry> {
        &self.registry
    }

    pub fn analyze(
        &self,
        offer_id: &str,
        sector_id: &str,
        text: &str,
    ) -> Result<AnalysisResult, EngineError> {
        let config = self.registry.get(sector_id)?;

        let keywords = self.extractor.extract(text, &config);
        let seniority = self.classifier.classify(text, &config);
        let signals = compute_signals(text, &keywords);

        debug!(
            "Offer {offer_id} [{sector_id}]: {} keyword matches, seniority {}",
            keywords.len(),
            seniority.label
        );

        Ok(AnalysisResult {
            offer_id: offer_id.to_string(),
            sector_id: sector_id.to_string(),
            keywords,
            seniority: seniority.label,
            signals,
            analyzed_at: Utc::now(),
        })
    }

    /// Analyzes postings concurrently, at most `workers` at a time.
    pub async fn analyze_batch(self: &Arc<Self>, postings: Vec<RawPosting>) -> BatchReport {
        let batch_id = Uuid::new_v4();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let total = postings.len();

        let mut handles = Vec::with_capacity(total);
        for posting in postings {
            let permit = Arc::clone(&semaphore).acquire_owned().await.ok();
            let analyzer = Arc::clone(self);
            let ids = (posting.offer_id.clone(), posting.sector_id.clone());
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                analyzer.analyze(&posting.offer_id, &posting.sector_id, &posting.text)
            });
            handles.push((ids, handle));
        }

        let mut results = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for ((offer_id, sector_id), handle) in handles {
            let (code, message) = match handle.await {
                Ok(Ok(result)) => {
                    results.push(result);
                    continue;
                }
                Ok(Err(e)) => (e.code().to_string(), e.to_string()),
                Err(join_err) => ("WORKER_FAILED".to_string(), join_err.to_string()),
            };
            warn!("Offer {offer_id} [{sector_id}] skipped: {message}");
            failures.push(OfferFailure {
                offer_id,
                sector_id,
                code,
                message,
            });
        }

        info!(
            "Batch {batch_id}: {} of {total} postings analyzed, {} failed",
            results.len(),
            failures.len()
        );

        BatchReport {
            batch_id,
            results,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{Category, UNSPECIFIED_SENIORITY};
    use crate::sector::document::{
        KeywordEntry, MatcherSpec, SectorDocument, SeniorityRuleEntry,
    };

    fn tech_document() -> SectorDocument {
        SectorDocument {
            id: "tech".to_string(),
            name: Some("Technology".to_string()),
            confidence_threshold: 0.5,
            min_keyword_frequency: 1,
            keywords: vec![
                KeywordEntry {
                    keyword: "Python".to_string(),
                    category: Category::Language,
                    matchers: vec![MatcherSpec::Literal("python".to_string())],
                    base_confidence: 0.9,
                },
                KeywordEntry {
                    keyword: "Docker".to_string(),
                    category: Category::Tool,
                    matchers: vec![MatcherSpec::Literal("docker".to_string())],
                    base_confidence: 0.8,
                },
            ],
            seniority_rules: vec![SeniorityRuleEntry {
                label: "senior".to_string(),
                indicators: vec!["senior".to_string()],
                weight: 1.0,
            }],
        }
    }

    fn make_analyzer() -> Arc<OfferAnalyzer> {
        let registry = SectorRegistry::detached();
        registry.install(tech_document()).unwrap();
        Arc::new(OfferAnalyzer::new(Arc::new(registry)).with_workers(2))
    }

    fn posting(offer_id: &str, sector_id: &str, text: &str) -> RawPosting {
        RawPosting {
            offer_id: offer_id.to_string(),
            sector_id: sector_id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_analyze_assembles_result() {
        let analyzer = make_analyzer();
        let result = analyzer
            .analyze(
                "offer-1",
                "tech",
                "Senior Python engineer. 5 years of experience with Docker and Python.",
            )
            .unwrap();
        assert_eq!(result.offer_id, "offer-1");
        assert_eq!(result.sector_id, "tech");
        assert_eq!(result.seniority, "senior");
        assert_eq!(result.keywords.len(), 3);
        assert_eq!(result.signals.required_experience_years, Some(5));
        assert_eq!(result.signals.top_category, Some(Category::Language));
    }

    #[test]
    fn test_analyze_unknown_sector_is_not_found() {
        let analyzer = make_analyzer();
        let err = analyzer.analyze("offer-1", "legal", "text").unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_analyze_empty_text_is_valid() {
        let analyzer = make_analyzer();
        let result = analyzer.analyze("offer-1", "tech", "").unwrap();
        assert!(result.keywords.is_empty());
        assert_eq!(result.seniority, UNSPECIFIED_SENIORITY);
    }

    #[tokio::test]
    async fn test_batch_isolates_failures_and_keeps_order() {
        let analyzer = make_analyzer();
        let report = analyzer
            .analyze_batch(vec![
                posting("a", "tech", "Python developer"),
                posting("b", "legal", "Contract lawyer"),
                posting("c", "tech", "Docker expert"),
                posting("d", "tech", ""),
            ])
            .await;

        let ids: Vec<&str> = report.results.iter().map(|r| r.offer_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].offer_id, "b");
        assert_eq!(report.failures[0].code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_batch_empty_input() {
        let analyzer = make_analyzer();
        let report = analyzer.analyze_batch(vec![]).await;
        assert!(report.results.is_empty());
        assert!(report.failures.is_empty());
    }
}
