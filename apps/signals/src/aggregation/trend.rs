//! Exponentially weighted trend over fixed-width time buckets.
//!
//! trend = α·current_bucket_frequency + (1−α)·settled, where `settled` is the
//! trend as it stood when the previous bucket closed. Empty buckets in between
//! decay `settled` by (1−α) each.
//!
//! Growth compares the bias-corrected averages: an average over k buckets is
//! divided by 1−(1−α)^k, so a series seeded from zero does not read as growing
//! while it warms up. A flat series has growth 1 at every age.

use chrono::{DateTime, Utc};

/// Bucket index of an instant for a bucket width in seconds.
pub fn bucket_of(at: DateTime<Utc>, width_secs: i64) -> i64 {
    at.timestamp().div_euclid(width_secs.max(1))
}

/// Trend values as seen from a given bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendView {
    pub trend_score: f64,
    pub previous_trend_score: f64,
    pub current_bucket_frequency: u64,
    pub previous_bucket_frequency: u64,
    /// Corrected trend over corrected previous trend. `None` before any bucket has closed.
    pub growth_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    first: i64,
    bucket: i64,
    current: u64,
    previous: u64,
    settled: f64,
}

impl TrendSeries {
    pub fn start(bucket: i64, count: u64) -> Self {
        Self {
            first: bucket,
            bucket,
            current: count,
            previous: 0,
            settled: 0.0,
        }
    }

    /// Latest bucket this series has counted into.
    pub fn bucket(&self) -> i64 {
        self.bucket
    }

    /// Counts `count` mentions in `bucket`. A bucket older than the current one
    /// is counted toward the current one.
    pub fn record(&mut self, bucket: i64, count: u64, alpha: f64) {
        if bucket > self.bucket {
            let gap = bucket - self.bucket;
            self.settled = settle(self.current, self.settled, gap, alpha);
            self.previous = if gap == 1 { self.current } else { 0 };
            self.current = count;
            self.bucket = bucket;
        } else {
            self.current += count;
        }
    }

    /// Projects the series forward to `at_bucket` without mutating it.
    pub fn view(&self, at_bucket: i64, alpha: f64) -> TrendView {
        let closed = at_bucket.max(self.bucket) - self.first;
        if at_bucket <= self.bucket {
            let trend_score = alpha * self.current as f64 + (1.0 - alpha) * self.settled;
            return TrendView {
                trend_score,
                previous_trend_score: self.settled,
                current_bucket_frequency: self.current,
                previous_bucket_frequency: self.previous,
                growth_rate: growth(trend_score, self.settled, closed, alpha),
            };
        }

        let gap = at_bucket - self.bucket;
        let settled = settle(self.current, self.settled, gap, alpha);
        let trend_score = (1.0 - alpha) * settled;
        TrendView {
            trend_score,
            previous_trend_score: settled,
            current_bucket_frequency: 0,
            previous_bucket_frequency: if gap == 1 { self.current } else { 0 },
            growth_rate: growth(trend_score, settled, closed, alpha),
        }
    }
}

/// Growth of the corrected trend after `closed` buckets have settled into `previous`.
fn growth(trend: f64, previous: f64, closed: i64, alpha: f64) -> Option<f64> {
    if closed <= 0 || previous <= 0.0 {
        return None;
    }
    let decay = 1.0 - alpha;
    let k = i32::try_from(closed).unwrap_or(i32::MAX);
    let previous_weight = 1.0 - decay.powi(k);
    let current_weight = 1.0 - decay.powi(k.saturating_add(1));
    if previous_weight <= 0.0 || current_weight <= 0.0 {
        return None;
    }
    Some((trend / current_weight) / (previous / previous_weight))
}

/// Closes the current bucket and decays through `gap - 1` empty ones.
fn settle(current: u64, settled: f64, gap: i64, alpha: f64) -> f64 {
    let closed = alpha * current as f64 + (1.0 - alpha) * settled;
    let empty = i32::try_from(gap - 1).unwrap_or(i32::MAX);
    closed * (1.0 - alpha).powi(empty)
}
