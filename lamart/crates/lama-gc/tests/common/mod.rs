//! Test Utilities for the lama-gc Test Suite
//!
//! Fixtures build collectors with small, predictable thresholds; assertion
//! helpers report the heap state on failure.

#![allow(dead_code)]

use lama_gc::{
    CollectionReport, GarbageCollector, GcConfig, GcError, GcReason, ObjectBody, Result, Value,
};

/// Threshold used by fixtures that exercise automatic collection
pub const SMALL_THRESHOLD: usize = 4 * 1024;

/// ============================================================================
/// GC FIXTURE
/// ============================================================================

/// Test fixture owning one collector
pub struct GcFixture {
    pub gc: GarbageCollector,
    pub config: GcConfig,
}

impl GcFixture {
    /// Collector with default configuration
    pub fn with_defaults() -> Self {
        Self::with_config(GcConfig::default())
    }

    /// Collector that only collects when asked to
    pub fn manual() -> Self {
        Self::with_config(GcConfig {
            auto_collect: false,
            ..Default::default()
        })
    }

    /// Collector with a small automatic threshold
    pub fn with_small_threshold() -> Self {
        Self::with_config(GcConfig {
            collect_threshold: SMALL_THRESHOLD,
            ..Default::default()
        })
    }

    /// Collector with a hard heap limit (for OOM tests)
    pub fn with_heap_limit(max_heap_bytes: usize) -> Self {
        Self::with_config(GcConfig {
            collect_threshold: max_heap_bytes,
            max_heap_bytes,
            ..Default::default()
        })
    }

    pub fn with_config(config: GcConfig) -> Self {
        let gc = GarbageCollector::new(config.clone())
            .expect("GC initialization should succeed with valid config");
        Self { gc, config }
    }

    /// Allocate an array of unboxed integers
    pub fn int_array(&mut self, items: &[i64]) -> Value {
        let values = items
            .iter()
            .map(|&n| Value::box_int(n).expect("test integers fit"))
            .collect();
        self.gc
            .allocate(ObjectBody::Array(values))
            .unwrap_or_else(|e| panic!("array allocation failed: {}", e))
    }

    /// Allocate a string
    pub fn string(&mut self, text: &str) -> Value {
        self.gc
            .allocate(ObjectBody::String(text.as_bytes().to_vec()))
            .unwrap_or_else(|e| panic!("string allocation failed: {}", e))
    }

    /// Allocate an array holding arbitrary values
    pub fn array(&mut self, items: Vec<Value>) -> Value {
        self.gc
            .allocate(ObjectBody::Array(items))
            .unwrap_or_else(|e| panic!("array allocation failed: {}", e))
    }

    /// Allocate inside a scope that is closed immediately, leaving garbage
    pub fn garbage<F>(&mut self, f: F) -> Value
    where
        F: FnOnce(&mut Self) -> Value,
    {
        let mark = self.gc.open_scope();
        let value = f(self);
        self.gc.close_scope(mark).expect("scope closes in order");
        value
    }

    pub fn collect(&mut self) -> CollectionReport {
        self.gc.collect(GcReason::Explicit)
    }

    pub fn live_objects(&self) -> usize {
        self.gc.heap().live_objects()
    }
}

/// ============================================================================
/// ASSERTION HELPERS
/// ============================================================================

/// Assert that a reference still resolves
#[track_caller]
pub fn assert_live(gc: &GarbageCollector, value: Value, context: &str) {
    assert!(
        gc.is_live(value),
        "{}: {} was collected while reachable ({} objects live)",
        context,
        value,
        gc.heap().live_objects()
    );
}

/// Assert that a reference was reclaimed and is now reported as stale
#[track_caller]
pub fn assert_reclaimed(gc: &GarbageCollector, value: Value, context: &str) {
    match gc.get(value) {
        Err(GcError::StaleReference { .. }) => {}
        other => panic!(
            "{}: expected {} to be reclaimed, got {:?}",
            context, value, other
        ),
    }
}

/// Read the unboxed integers of an array
pub fn read_ints(gc: &GarbageCollector, array: Value) -> Result<Vec<i64>> {
    match &gc.get(array)?.body {
        ObjectBody::Array(items) => items.iter().map(|v| v.unbox()).collect(),
        other => Err(GcError::unexpected("array", other.kind().to_string())),
    }
}
