use crate::models::market::{SectorKeywordStat, SectorSnapshot};
use crate::recommendation::models::{Recommendation, RecommendationKind, RecommendationSettings};

/// Keywords whose trend grows faster than the multiplier from the previous bucket, or
/// brand new with enough mentions. Independent of the user's skills.
pub(crate) fn emerging(
    snapshot: &SectorSnapshot,
    settings: &RecommendationSettings,
) -> Vec<Recommendation> {
    snapshot
        .stats
        .iter()
        .filter_map(|stat| {
            let (growth_norm, why) = match stat.growth_rate {
                Some(growth) if growth > settings.emerging_multiplier => (
                    1.0 - settings.emerging_multiplier / growth,
                    format!("trend grew x{growth:.1} over the previous period"),
                ),
                Some(_) => return None,
                None if stat.current_bucket_frequency >= settings.emerging_min_new_mentions => (
                    1.0,
                    format!(
                        "new this period with {} mentions",
                        stat.current_bucket_frequency
                    ),
                ),
                None => return None,
            };
            Some(make_recommendation(snapshot, stat, growth_norm, why, settings))
        })
        .collect()
}

fn make_recommendation(
    snapshot: &SectorSnapshot,
    stat: &SectorKeywordStat,
    growth_norm: f64,
    why: String,
    settings: &RecommendationSettings,
) -> Recommendation {
    let score = settings.emerging_priority_weight * growth_norm;
    Recommendation {
        kind: RecommendationKind::EmergingOpportunity,
        sector_id: snapshot.sector_id.clone(),
        priority: score,
        title: format!("Watch {}", stat.keyword),
        rationale: format!("{} in '{}': {why}", stat.keyword, snapshot.sector_id),
        action_items: vec![format!(
            "Explore {} postings in '{}'",
            stat.keyword, snapshot.sector_id
        )],
        relevance_score: score,
        exploratory: true,
    }
}
