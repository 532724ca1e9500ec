//! Aggregation Engine: per-sector keyword statistics folded from analysis results.
//!
//! Each sector owns its own `RwLock`, so merges into one sector serialize while
//! different sectors proceed in parallel. Snapshot reads poll for the read lock
//! up to `snapshot_timeout`; when the lock stays busy the last published copy is
//! served with `stale = true`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, TryLockError};
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::aggregation::trend::{bucket_of, TrendSeries};
use crate::errors::EngineError;
use crate::models::analysis::{AnalysisResult, Category};
use crate::models::market::{MarketSnapshot, SectorKeywordStat, SectorSnapshot};
use crate::sector::SectorRegistry;

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(1);

// ────────────────────────────────────────────────────────────────
// Settings
// ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AggregationSettings {
    /// Weight of the current bucket in the trend score.
    pub alpha: f64,
    pub bucket_width: Duration,
    pub snapshot_timeout: Duration,
    /// Hide keywords not seen for more than this many buckets. `None` keeps them all.
    pub retire_after_buckets: Option<u32>,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            bucket_width: Duration::from_secs(24 * 60 * 60),
            snapshot_timeout: Duration::from_millis(250),
            retire_after_buckets: None,
        }
    }
}

impl AggregationSettings {
    fn bucket_secs(&self) -> i64 {
        i64::try_from(self.bucket_width.as_secs()).unwrap_or(i64::MAX).max(1)
    }
}

// ────────────────────────────────────────────────────────────────
// Per-sector state
// ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct KeywordState {
    category: Category,
    frequency: u64,
    offer_count: u64,
    last_seen: NaiveDate,
    series: TrendSeries,
}

#[derive(Debug, Default)]
struct SectorState {
    keywords: BTreeMap<String, KeywordState>,
    total_offers: u64,
    seniority: BTreeMap<String, u64>,
}

#[derive(Debug, Default)]
struct SectorBook {
    state: RwLock<SectorState>,
    last_published: Mutex<Option<SectorSnapshot>>,
}

// ────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────

pub struct AggregationEngine {
    registry: Arc<SectorRegistry>,
    settings: AggregationSettings,
    books: RwLock<HashMap<String, Arc<SectorBook>>>,
}

impl AggregationEngine {
    pub fn new(registry: Arc<SectorRegistry>, settings: AggregationSettings) -> Self {
        Self {
            registry,
            settings,
            books: RwLock::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &AggregationSettings {
        &self.settings
    }

    /// Folds one analysis result into its sector's statistics.
    pub fn merge(&self, result: &AnalysisResult) {
        let book = self.book_or_insert(&result.sector_id);
        let bucket = bucket_of(result.analyzed_at, self.settings.bucket_secs());
        let seen = result.analyzed_at.date_naive();
        let counts = result.keyword_counts();

        let mut state = book.state.write().unwrap_or_else(PoisonError::into_inner);
        for (keyword, (category, count)) in &counts {
            match state.keywords.get_mut(*keyword) {
                Some(kw) => {
                    kw.frequency += count;
                    kw.offer_count += 1;
                    kw.last_seen = kw.last_seen.max(seen);
                    kw.series.record(bucket, *count, self.settings.alpha);
                }
                None => {
                    state.keywords.insert(
                        keyword.to_string(),
                        KeywordState {
                            category: *category,
                            frequency: *count,
                            offer_count: 1,
                            last_seen: seen,
                            series: TrendSeries::start(bucket, *count),
                        },
                    );
                }
            }
        }
        state.total_offers += 1;
        *state.seniority.entry(result.seniority.clone()).or_default() += 1;

        debug!(
            "Merged offer {} into '{}': {} distinct keywords, {} offers total",
            result.offer_id,
            result.sector_id,
            counts.len(),
            state.total_offers
        );
    }

    pub fn merge_all<'a>(&self, results: impl IntoIterator<Item = &'a AnalysisResult>) {
        for result in results {
            self.merge(result);
        }
    }

    pub fn snapshot(&self, sector_id: &str) -> Result<SectorSnapshot, EngineError> {
        self.snapshot_at(sector_id, Utc::now())
    }

    /// Snapshot with trend scores projected to `at`.
    pub fn snapshot_at(
        &self,
        sector_id: &str,
        at: DateTime<Utc>,
    ) -> Result<SectorSnapshot, EngineError> {
        let config = self.registry.get(sector_id)?;

        let Some(book) = self.book(sector_id) else {
            return Ok(SectorSnapshot::empty(sector_id, at));
        };

        let Some(state) = self.read_within_timeout(&book) else {
            warn!(
                "Snapshot of '{sector_id}' timed out after {:?}; serving last published copy",
                self.settings.snapshot_timeout
            );
            return Ok(stale_copy(&book, sector_id, at));
        };

        let snapshot = self.build_snapshot(
            sector_id,
            &state,
            at,
            u64::from(config.min_keyword_frequency),
        );
        drop(state);

        *book
            .last_published
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        Ok(snapshot)
    }

    pub fn market_snapshot<S: AsRef<str>>(
        &self,
        sector_ids: &[S],
    ) -> Result<MarketSnapshot, EngineError> {
        self.market_snapshot_at(sector_ids, Utc::now())
    }

    pub fn market_snapshot_at<S: AsRef<str>>(
        &self,
        sector_ids: &[S],
        at: DateTime<Utc>,
    ) -> Result<MarketSnapshot, EngineError> {
        sector_ids
            .iter()
            .map(|id| self.snapshot_at(id.as_ref(), at))
            .collect()
    }

    fn book(&self, sector_id: &str) -> Option<Arc<SectorBook>> {
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(sector_id)
            .cloned()
    }

    fn book_or_insert(&self, sector_id: &str) -> Arc<SectorBook> {
        if let Some(book) = self.book(sector_id) {
            return book;
        }
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(books.entry(sector_id.to_string()).or_default())
    }

    fn read_within_timeout<'a>(
        &self,
        book: &'a SectorBook,
    ) -> Option<RwLockReadGuard<'a, SectorState>> {
        let deadline = Instant::now() + self.settings.snapshot_timeout;
        loop {
            match book.state.try_read() {
                Ok(guard) => return Some(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Some(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    std::thread::sleep(LOCK_POLL_INTERVAL);
                }
            }
        }
    }

    fn build_snapshot(
        &self,
        sector_id: &str,
        state: &SectorState,
        at: DateTime<Utc>,
        min_frequency: u64,
    ) -> SectorSnapshot {
        let at_bucket = bucket_of(at, self.settings.bucket_secs());
        let retire = self.settings.retire_after_buckets.map(i64::from);

        let mut stats: Vec<SectorKeywordStat> = state
            .keywords
            .iter()
            .filter(|(_, kw)| kw.frequency >= min_frequency)
            .filter(|(_, kw)| retire.is_none_or(|n| at_bucket - kw.series.bucket() <= n))
            .map(|(keyword, kw)| {
                let view = kw.series.view(at_bucket, self.settings.alpha);
                SectorKeywordStat {
                    sector_id: sector_id.to_string(),
                    keyword: keyword.clone(),
                    category: kw.category,
                    frequency: kw.frequency,
                    offer_count: kw.offer_count,
                    trend_score: view.trend_score,
                    previous_trend_score: view.previous_trend_score,
                    current_bucket_frequency: view.current_bucket_frequency,
                    previous_bucket_frequency: view.previous_bucket_frequency,
                    growth_rate: view.growth_rate,
                    last_seen: kw.last_seen,
                }
            })
            .collect();

        stats.sort_by(|a, b| {
            b.trend_score
                .total_cmp(&a.trend_score)
                .then(b.frequency.cmp(&a.frequency))
                .then_with(|| a.keyword.cmp(&b.keyword))
        });

        debug!(
            "Snapshot of '{sector_id}': {} of {} keywords visible",
            stats.len(),
            state.keywords.len()
        );

        SectorSnapshot {
            sector_id: sector_id.to_string(),
            taken_at: at,
            stale: false,
            total_offers: state.total_offers,
            seniority_distribution: state.seniority.clone(),
            stats,
        }
    }
}

fn stale_copy(book: &SectorBook, sector_id: &str, at: DateTime<Utc>) -> SectorSnapshot {
    let published = book
        .last_published
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    let mut snapshot = published.unwrap_or_else(|| SectorSnapshot::empty(sector_id, at));
    snapshot.stale = true;
    snapshot
}
