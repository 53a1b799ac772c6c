//! Pause durations in power-of-two buckets
//!
//! Tracks the pause time distribution with logarithmic buckets, enough to
//! answer P50/P95/P99 questions without storing every sample.

use std::collections::BTreeMap;

/// Bucketed distribution of pause times in microseconds
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Upper bound of each bucket to its sample count
    buckets: BTreeMap<u64, u64>,
    count: u64,
    sum: u64,
    min: u64,
    max: u64,
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            count: 0,
            sum: 0,
            min: u64::MAX,
            max: 0,
        }
    }

    /// Add one sample
    pub fn record(&mut self, value: u64) {
        *self.buckets.entry(Self::bucket(value)).or_insert(0) += 1;
        self.count += 1;
        self.sum = self.sum.saturating_add(value);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Bucket for a value: 0, then powers of two (1, 2, 4, 8, ...)
    fn bucket(value: u64) -> u64 {
        if value == 0 {
            0
        } else {
            1 << (63 - value.leading_zeros() as u64)
        }
    }

    /// Lower bound of the bucket holding the p-th percentile
    pub fn percentile(&self, p: f64) -> u64 {
        if self.count == 0 {
            return 0;
        }

        let target = ((self.count as f64 * p).ceil() as u64).max(1);
        let mut cumulative = 0;

        for (&bucket, &count) in &self.buckets {
            cumulative += count;
            if cumulative >= target {
                return bucket;
            }
        }

        self.buckets.last_key_value().map(|(&k, _)| k).unwrap_or(0)
    }

    pub fn p50(&self) -> u64 {
        self.percentile(0.50)
    }

    pub fn p99(&self) -> u64 {
        self.percentile(0.99)
    }

    pub fn mean(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        self.sum / self.count
    }

    pub fn min(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.min
        }
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}
