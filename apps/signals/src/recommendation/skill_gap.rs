use std::collections::BTreeSet;

use crate::models::market::{SectorKeywordStat, SectorSnapshot};
use crate::recommendation::models::{Recommendation, RecommendationKind, RecommendationSettings};

/// Highest-trending keywords in the user's own sector that the user lacks.
///
/// priority = w_trend·(trend / max trend in sector) + w_prev·prevalence
///
/// Prevalence is the lifetime share of the sector's postings that mention the keyword;
/// recent activity only enters through the trend term.
pub(crate) fn skill_gaps(
    snapshot: &SectorSnapshot,
    skills: &BTreeSet<String>,
    settings: &RecommendationSettings,
) -> Vec<Recommendation> {
    let max_trend = snapshot.max_trend_score();

    let mut missing: Vec<&SectorKeywordStat> = snapshot
        .stats
        .iter()
        .filter(|s| !skills.contains(&s.keyword.to_lowercase()))
        .collect();
    missing.sort_by(|a, b| {
        b.trend_score
            .total_cmp(&a.trend_score)
            .then(b.frequency.cmp(&a.frequency))
            .then_with(|| a.keyword.cmp(&b.keyword))
    });

    missing
        .into_iter()
        .take(settings.skill_gap_count)
        .map(|stat| {
            let trend_norm = if max_trend > 0.0 {
                (stat.trend_score / max_trend).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let prevalence = snapshot.prevalence(stat);
            Recommendation {
                kind: RecommendationKind::SkillGap,
                sector_id: snapshot.sector_id.clone(),
                priority: settings.skill_gap_trend_weight * trend_norm
                    + settings.skill_gap_prevalence_weight * prevalence,
                title: format!("Learn {}", stat.keyword),
                rationale: format!(
                    "{} ({}) appears in {} of {} '{}' postings, trend score {:.2}",
                    stat.keyword,
                    stat.category,
                    stat.offer_count,
                    snapshot.total_offers,
                    snapshot.sector_id,
                    stat.trend_score
                ),
                action_items: vec![format!("Add {} to your skill set", stat.keyword)],
                relevance_score: prevalence,
                exploratory: false,
            }
        })
        .collect()
}
