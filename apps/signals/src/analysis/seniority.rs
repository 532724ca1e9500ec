//! Seniority classification by weighted indicator phrases.
//!
//! score(label) = Σ over rules with that label of (word-bounded phrase hits × weight).
//! Strictly highest score wins; a tie at the top, or all zeros, yields "unspecified".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::text::count_bounded;
use crate::models::analysis::UNSPECIFIED_SENIORITY;
use crate::sector::SectorConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorHit {
    pub phrase: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
    pub hits: Vec<IndicatorHit>,
}

/// Winning label plus the per-label scores that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeniorityAssessment {
    pub label: String,
    /// One entry per configured label, sorted by label.
    pub scores: Vec<LabelScore>,
}

#[derive(Debug, Clone, Default)]
pub struct SeniorityClassifier;

impl SeniorityClassifier {
    pub fn classify(&self, text: &str, config: &SectorConfig) -> SeniorityAssessment {
        let mut by_label: BTreeMap<&str, LabelScore> = BTreeMap::new();

        for rule in &config.seniority_rules {
            let entry = by_label
                .entry(rule.label.as_str())
                .or_insert_with(|| LabelScore {
                    label: rule.label.clone(),
                    score: 0.0,
                    hits: Vec::new(),
                });

            for indicator in &rule.indicators {
                let count = count_bounded(&indicator.regex, text);
                if count == 0 {
                    continue;
                }
                entry.score += count as f64 * rule.weight;
                entry.hits.push(IndicatorHit {
                    phrase: indicator.phrase.clone(),
                    count,
                });
            }
        }

        let scores: Vec<LabelScore> = by_label.into_values().collect();
        SeniorityAssessment {
            label: pick_winner(&scores),
            scores,
        }
    }
}

fn pick_winner(scores: &[LabelScore]) -> String {
    let top = scores.iter().map(|s| s.score).fold(0.0_f64, f64::max);
    if top <= 0.0 {
        return UNSPECIFIED_SENIORITY.to_string();
    }
    let mut leaders = scores.iter().filter(|s| s.score == top);
    match (leaders.next(), leaders.next()) {
        (Some(winner), None) => winner.label.clone(),
        _ => UNSPECIFIED_SENIORITY.to_string(),
    }
}
