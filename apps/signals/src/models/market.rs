use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::analysis::Category;

/// Running statistics for one keyword within one sector, as seen at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorKeywordStat {
    pub sector_id: String,
    pub keyword: String,
    pub category: Category,
    /// Cumulative match count. Never decreases.
    pub frequency: u64,
    /// Number of postings that mentioned the keyword at least once.
    pub offer_count: u64,
    pub trend_score: f64,
    /// Trend score as of the end of the previous bucket.
    pub previous_trend_score: f64,
    pub current_bucket_frequency: u64,
    pub previous_bucket_frequency: u64,
    /// Warm-up corrected trend growth against the previous bucket; 1.0 means flat.
    /// `None` while the keyword is in its first bucket.
    #[serde(default)]
    pub growth_rate: Option<f64>,
    pub last_seen: NaiveDate,
}

/// Point-in-time view of one sector's statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorSnapshot {
    pub sector_id: String,
    pub taken_at: DateTime<Utc>,
    /// True when the live state could not be read in time and an older copy was served.
    pub stale: bool,
    pub total_offers: u64,
    pub seniority_distribution: BTreeMap<String, u64>,
    /// Sorted by trend desc, frequency desc, keyword asc.
    pub stats: Vec<SectorKeywordStat>,
}

impl SectorSnapshot {
    pub fn empty(sector_id: impl Into<String>, taken_at: DateTime<Utc>) -> Self {
        Self {
            sector_id: sector_id.into(),
            taken_at,
            stale: false,
            total_offers: 0,
            seniority_distribution: BTreeMap::new(),
            stats: Vec::new(),
        }
    }

    /// Case-insensitive lookup, folded with `to_lowercase` like profile skills.
    pub fn stat(&self, keyword: &str) -> Option<&SectorKeywordStat> {
        let wanted = keyword.trim().to_lowercase();
        self.stats
            .iter()
            .find(|s| s.keyword.to_lowercase() == wanted)
    }

    /// Share of all postings this sector has seen that mention the keyword.
    ///
    /// Cumulative over the sector's lifetime, not windowed. Recency enters skill-gap
    /// priority through `trend_score`.
    pub fn prevalence(&self, stat: &SectorKeywordStat) -> f64 {
        if self.total_offers == 0 {
            return 0.0;
        }
        (stat.offer_count as f64 / self.total_offers as f64).clamp(0.0, 1.0)
    }

    pub fn max_trend_score(&self) -> f64 {
        self.stats
            .iter()
            .map(|s| s.trend_score)
            .fold(0.0_f64, f64::max)
    }
}

/// A set of sector snapshots handed to the recommendation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub sectors: BTreeMap<String, SectorSnapshot>,
}

impl MarketSnapshot {
    pub fn insert(&mut self, snapshot: SectorSnapshot) {
        self.sectors.insert(snapshot.sector_id.clone(), snapshot);
    }

    pub fn sector(&self, sector_id: &str) -> Option<&SectorSnapshot> {
        self.sectors.get(sector_id)
    }

    pub fn is_stale(&self) -> bool {
        self.sectors.values().any(|s| s.stale)
    }
}

impl FromIterator<SectorSnapshot> for MarketSnapshot {
    fn from_iter<T: IntoIterator<Item = SectorSnapshot>>(iter: T) -> Self {
        let mut market = MarketSnapshot::default();
        for snapshot in iter {
            market.insert(snapshot);
        }
        market
    }
}
