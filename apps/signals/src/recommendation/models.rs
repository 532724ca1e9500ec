use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::analysis::Category;

/// Declaration order is the tie-break order when priorities are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    SkillGap,
    Transition,
    EmergingOpportunity,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::SkillGap => "skill_gap",
            RecommendationKind::Transition => "transition",
            RecommendationKind::EmergingOpportunity => "emerging_opportunity",
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub sector_id: String,
    /// Higher is more urgent.
    pub priority: f64,
    pub title: String,
    pub rationale: String,
    pub action_items: Vec<String>,
    pub relevance_score: f64, // 0.0 – 1.0
    /// Market signal only; not tied to the user's skills.
    pub exploratory: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSettings {
    pub skill_gap_count: usize,
    pub skill_gap_trend_weight: f64,
    pub skill_gap_prevalence_weight: f64,
    /// Percentile (0–100) of keyword frequency that marks a skill as essential.
    pub essential_percentile: f64,
    /// Transitions are surfaced only strictly above this feasibility.
    pub transition_threshold: f64,
    pub transition_priority_weight: f64,
    /// Growth ratio a keyword must exceed to count as emerging.
    pub emerging_multiplier: f64,
    /// Current-bucket mentions a keyword with no history needs to count as emerging.
    pub emerging_min_new_mentions: u64,
    pub emerging_priority_weight: f64,
    pub strength_min_frequency: u64,
    pub max_strengths: usize,
    pub max_missing: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            skill_gap_count: 5,
            skill_gap_trend_weight: 0.6,
            skill_gap_prevalence_weight: 0.4,
            essential_percentile: 75.0,
            transition_threshold: 0.6,
            transition_priority_weight: 0.9,
            emerging_multiplier: 1.5,
            emerging_min_new_mentions: 3,
            emerging_priority_weight: 0.5,
            strength_min_frequency: 5,
            max_strengths: 5,
            max_missing: 10,
        }
    }
}

/// How well a user's skills cover one sector's demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCoverage {
    pub sector_id: String,
    /// Share of the sector's visible keywords the user already has.
    pub coverage_ratio: f64,
    pub in_demand_strengths: Vec<SkillDemand>,
    pub top_missing: Vec<SkillDemand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDemand {
    pub keyword: String,
    pub category: Category,
    pub frequency: u64,
    pub trend_score: f64,
}
