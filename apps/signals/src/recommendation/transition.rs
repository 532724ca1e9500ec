//! Sector transition feasibility.
//!
//! Essential skills of a sector are its visible keywords whose frequency is at
//! or above the configured percentile (nearest-rank). Feasibility is the share
//! of those the user already has.

use std::collections::BTreeSet;

use crate::models::market::{SectorKeywordStat, SectorSnapshot};
use crate::recommendation::models::{Recommendation, RecommendationKind, RecommendationSettings};

/// Essential skills ordered by frequency desc, then keyword.
pub fn essential_skills(snapshot: &SectorSnapshot, percentile: f64) -> Vec<&SectorKeywordStat> {
    let mut frequencies: Vec<u64> = snapshot.stats.iter().map(|s| s.frequency).collect();
    let Some(cutoff) = nearest_rank(&mut frequencies, percentile) else {
        return Vec::new();
    };

    let mut essential: Vec<&SectorKeywordStat> = snapshot
        .stats
        .iter()
        .filter(|s| s.frequency >= cutoff)
        .collect();
    essential.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    essential
}

/// Share of `essential` covered by `skills` (lowercased). Zero when nothing is essential.
pub fn feasibility(skills: &BTreeSet<String>, essential: &[&SectorKeywordStat]) -> f64 {
    if essential.is_empty() {
        return 0.0;
    }
    let covered = essential
        .iter()
        .filter(|s| skills.contains(&s.keyword.to_lowercase()))
        .count();
    covered as f64 / essential.len() as f64
}

pub(crate) fn transition(
    snapshot: &SectorSnapshot,
    skills: &BTreeSet<String>,
    settings: &RecommendationSettings,
) -> Option<Recommendation> {
    let essential = essential_skills(snapshot, settings.essential_percentile);
    let feasibility = feasibility(skills, &essential);
    if feasibility <= settings.transition_threshold {
        return None;
    }

    let missing: Vec<String> = essential
        .iter()
        .filter(|s| !skills.contains(&s.keyword.to_lowercase()))
        .map(|s| s.keyword.clone())
        .collect();

    Some(Recommendation {
        kind: RecommendationKind::Transition,
        sector_id: snapshot.sector_id.clone(),
        priority: settings.transition_priority_weight * feasibility,
        title: format!("Move into {}", snapshot.sector_id),
        rationale: format!(
            "You cover {} of {} essential '{}' skills ({:.0}%)",
            essential.len() - missing.len(),
            essential.len(),
            snapshot.sector_id,
            feasibility * 100.0
        ),
        action_items: missing,
        relevance_score: feasibility,
        exploratory: false,
    })
}

/// Nearest-rank percentile of `values`; sorts in place.
fn nearest_rank(values: &mut [u64], percentile: f64) -> Option<u64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let n = values.len();
    let rank = ((percentile.clamp(0.0, 100.0) / 100.0) * n as f64).ceil() as usize;
    Some(values[rank.clamp(1, n) - 1])
}
