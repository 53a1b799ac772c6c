//! Stats Module - GC Performance Monitoring
//!
//! Collects allocation and collection counters for tuning and debugging.
//!
//! Metrics:
//! - Allocation count and bytes
//! - Collection count, freed objects and bytes
//! - Peak live heap
//! - Pause time distribution

pub mod histogram;

pub use histogram::Histogram;

use serde::Serialize;
use std::time::{Duration, Instant};

/// GcStats - statistics collector for one collector instance
#[derive(Debug, Clone)]
pub struct GcStats {
    allocations: u64,
    bytes_allocated: u64,
    collections: u64,
    objects_freed: u64,
    bytes_freed: u64,
    peak_live_objects: usize,
    peak_live_bytes: usize,
    pause_stats: Histogram,
    start_time: Instant,
}

impl GcStats {
    pub fn new() -> Self {
        Self {
            allocations: 0,
            bytes_allocated: 0,
            collections: 0,
            objects_freed: 0,
            bytes_freed: 0,
            peak_live_objects: 0,
            peak_live_bytes: 0,
            pause_stats: Histogram::new(),
            start_time: Instant::now(),
        }
    }

    /// Record one allocation and the live heap after it
    pub fn record_allocation(&mut self, size: usize, live_objects: usize, live_bytes: usize) {
        self.allocations += 1;
        self.bytes_allocated += size as u64;
        self.peak_live_objects = self.peak_live_objects.max(live_objects);
        self.peak_live_bytes = self.peak_live_bytes.max(live_bytes);
    }

    /// Record a finished collection
    pub fn record_collection(&mut self, freed: usize, bytes_freed: usize, pause: Duration) {
        self.collections += 1;
        self.objects_freed += freed as u64;
        self.bytes_freed += bytes_freed as u64;
        self.pause_stats.record(pause.as_nanos() as u64);
    }

    pub fn collections(&self) -> u64 {
        self.collections
    }

    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Get pause time histogram (nanoseconds)
    pub fn pause_histogram(&self) -> &Histogram {
        &self.pause_stats
    }

    /// Get summary statistics
    pub fn summary(&self, live_objects: usize, live_bytes: usize) -> GcSummary {
        GcSummary {
            allocations: self.allocations,
            bytes_allocated: self.bytes_allocated,
            collections: self.collections,
            objects_freed: self.objects_freed,
            bytes_freed: self.bytes_freed,
            live_objects,
            live_bytes,
            peak_live_objects: self.peak_live_objects,
            peak_live_bytes: self.peak_live_bytes,
            avg_pause_us: self.pause_stats.mean() as f64 / 1_000.0,
            max_pause_us: self.pause_stats.max() as f64 / 1_000.0,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for GcStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GcSummary {
    pub allocations: u64,
    pub bytes_allocated: u64,
    pub collections: u64,
    pub objects_freed: u64,
    pub bytes_freed: u64,
    pub live_objects: usize,
    pub live_bytes: usize,
    pub peak_live_objects: usize,
    pub peak_live_bytes: usize,
    /// Average pause time (us)
    pub avg_pause_us: f64,
    /// Max pause time (us)
    pub max_pause_us: f64,
    pub uptime_secs: u64,
}

impl GcSummary {
    /// Render as a JSON object
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_summarize() {
        let mut stats = GcStats::new();
        stats.record_allocation(32, 1, 32);
        stats.record_allocation(48, 2, 80);
        stats.record_collection(1, 32, Duration::from_micros(10));

        let summary = stats.summary(1, 48);
        assert_eq!(summary.allocations, 2);
        assert_eq!(summary.bytes_allocated, 80);
        assert_eq!(summary.collections, 1);
        assert_eq!(summary.objects_freed, 1);
        assert_eq!(summary.peak_live_bytes, 80);
        assert_eq!(summary.live_bytes, 48);
        assert_eq!(summary.max_pause_us, 10.0);
    }

    #[test]
    fn test_summary_json() {
        let summary = GcStats::new().summary(0, 0);
        let json = summary.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["collections"], 0);
        assert_eq!(parsed["live_bytes"], 0);
    }
}
