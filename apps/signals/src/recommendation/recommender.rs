//! Recommendation Engine: ranks skill gaps, sector transitions and emerging
//! keywords for one user against a market snapshot.
//!
//! Works only on the snapshot it is handed: no locks, no I/O, same input gives
//! the same output.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::errors::EngineError;
use crate::models::market::{MarketSnapshot, SectorKeywordStat, SectorSnapshot};
use crate::models::profile::UserProfile;
use crate::recommendation::emerging::emerging;
use crate::recommendation::models::{
    Recommendation, RecommendationSettings, SkillCoverage, SkillDemand,
};
use crate::recommendation::skill_gap::skill_gaps;
use crate::recommendation::transition::transition;

pub const DEFAULT_MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    settings: RecommendationSettings,
}

impl RecommendationEngine {
    pub fn new(settings: RecommendationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RecommendationSettings {
        &self.settings
    }

    pub fn recommend_default(
        &self,
        profile: &UserProfile,
        market: &MarketSnapshot,
    ) -> Result<Vec<Recommendation>, EngineError> {
        self.recommend(profile, market, DEFAULT_MAX_RESULTS)
    }

    pub fn recommend(
        &self,
        profile: &UserProfile,
        market: &MarketSnapshot,
        max_results: usize,
    ) -> Result<Vec<Recommendation>, EngineError> {
        profile.validate()?;
        let primary = market.sector(&profile.primary_sector_id).ok_or_else(|| {
            EngineError::InvalidInput(format!(
                "no market data for primary sector '{}'",
                profile.primary_sector_id
            ))
        })?;
        if market.is_stale() {
            warn!("Recommending from a stale market snapshot");
        }

        let skills = profile.normalized_skills();
        let targets = self.target_snapshots(profile, market);

        let mut recommendations = skill_gaps(primary, &skills, &self.settings);
        recommendations.extend(
            targets
                .iter()
                .filter_map(|target| transition(target, &skills, &self.settings)),
        );
        for snapshot in std::iter::once(primary).chain(targets.iter().copied()) {
            recommendations.extend(emerging(snapshot, &self.settings));
        }

        let candidates = recommendations.len();
        recommendations.sort_by(compare);
        recommendations.truncate(max_results);

        debug!(
            "Recommendations for primary sector '{}': {} candidates, {} returned",
            profile.primary_sector_id,
            candidates,
            recommendations.len()
        );
        Ok(recommendations)
    }

    /// How the user's skills line up with one sector's demand.
    pub fn coverage(&self, profile: &UserProfile, snapshot: &SectorSnapshot) -> SkillCoverage {
        let skills = profile.normalized_skills();
        let (have, missing): (Vec<&SectorKeywordStat>, Vec<&SectorKeywordStat>) = snapshot
            .stats
            .iter()
            .partition(|s| skills.contains(&s.keyword.to_lowercase()));

        let coverage_ratio = if snapshot.stats.is_empty() {
            0.0
        } else {
            have.len() as f64 / snapshot.stats.len() as f64
        };

        let mut strengths: Vec<&SectorKeywordStat> = have
            .into_iter()
            .filter(|s| s.frequency >= self.settings.strength_min_frequency)
            .collect();
        strengths.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.keyword.cmp(&b.keyword))
        });

        let mut missing = missing;
        missing.sort_by(|a, b| {
            b.trend_score
                .total_cmp(&a.trend_score)
                .then(b.frequency.cmp(&a.frequency))
                .then_with(|| a.keyword.cmp(&b.keyword))
        });

        SkillCoverage {
            sector_id: snapshot.sector_id.clone(),
            coverage_ratio,
            in_demand_strengths: demands(strengths, self.settings.max_strengths),
            top_missing: demands(missing, self.settings.max_missing),
        }
    }

    fn target_snapshots<'a>(
        &self,
        profile: &UserProfile,
        market: &'a MarketSnapshot,
    ) -> Vec<&'a SectorSnapshot> {
        profile
            .target_sector_ids
            .iter()
            .filter(|id| **id != profile.primary_sector_id)
            .filter_map(|id| {
                let snapshot = market.sector(id);
                if snapshot.is_none() {
                    warn!("Target sector '{id}' has no market data; skipped");
                }
                snapshot
            })
            .collect()
    }
}

fn demands(stats: Vec<&SectorKeywordStat>, limit: usize) -> Vec<SkillDemand> {
    stats
        .into_iter()
        .take(limit)
        .map(|s| SkillDemand {
            keyword: s.keyword.clone(),
            category: s.category,
            frequency: s.frequency,
            trend_score: s.trend_score,
        })
        .collect()
}

fn compare(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.priority
        .total_cmp(&a.priority)
        .then(b.relevance_score.total_cmp(&a.relevance_score))
        .then(a.kind.cmp(&b.kind))
        .then_with(|| a.sector_id.cmp(&b.sector_id))
        .then_with(|| a.title.cmp(&b.title))
}
