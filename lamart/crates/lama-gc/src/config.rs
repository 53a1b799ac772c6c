//! Collector tuning knobs
//!
//! Manages all configuration parameters for lama-gc.
//! The defaults suit a small interpreter heap; embedders tune the collection
//! threshold and the hard heap limit.

/// Main configuration for the Lama garbage collector
///
/// # Examples
///
/// ```rust
/// use lama_gc::GcConfig;
///
/// // Stock settings
/// let config = GcConfig::default();
/// assert!(config.validate().is_ok());
///
/// // Small heap that collects often
/// let config = GcConfig {
///     collect_threshold: 4 * 1024,
///     max_heap_bytes: 64 * 1024,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GcConfig {
    /// Number of object slots reserved up front
    ///
    /// Default: 1024
    pub initial_capacity: usize,

    /// Bytes allocated since the last collection before a new one is triggered
    ///
    /// Also the floor for the adaptive threshold computed after each cycle.
    /// Default: 1MB
    pub collect_threshold: usize,

    /// Threshold growth relative to live bytes after a collection
    ///
    /// Next threshold = max(collect_threshold, live_bytes * growth_factor).
    /// Default: 2.0
    pub growth_factor: f64,

    /// Hard limit on live heap bytes
    ///
    /// Allocation fails with `OutOfMemory` once exceeded after a collection.
    /// Default: 256MB
    pub max_heap_bytes: usize,

    /// Collect automatically when the threshold is crossed
    ///
    /// When false, collection only happens on explicit request or when the
    /// heap limit is hit.
    /// Default: true
    pub auto_collect: bool,

    /// Write each cycle to the process-wide event log (`logging`), off by default
    pub verbose: bool,

    /// Keep allocation and pause counters in `GcStats` (on by default)
    pub stats_enabled: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        GcConfig {
            initial_capacity: 1024,
            collect_threshold: MB,
            growth_factor: 2.0,
            max_heap_bytes: 256 * MB,
            auto_collect: true,
            verbose: false,
            stats_enabled: true,
        }
    }
}

impl GcConfig {
    /// Reject settings the collector cannot run with
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lama_gc::GcConfig;
    ///
    /// let config = GcConfig {
    ///     max_heap_bytes: 0,
    ///     ..Default::default()
    /// };
    ///
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_heap_bytes == 0 {
            return Err(ConfigError::InvalidHeapSize(
                "max_heap_bytes must be > 0".to_string(),
            ));
        }

        if self.collect_threshold == 0 {
            return Err(ConfigError::InvalidThreshold(
                "collect_threshold must be > 0".to_string(),
            ));
        }

        if self.collect_threshold > self.max_heap_bytes {
            return Err(ConfigError::InvalidThreshold(
                "collect_threshold cannot exceed max_heap_bytes".to_string(),
            ));
        }

        if !self.growth_factor.is_finite() || self.growth_factor < 1.0 {
            return Err(ConfigError::InvalidGrowthFactor(format!(
                "growth_factor must be a finite value >= 1.0, got {}",
                self.growth_factor
            )));
        }

        if self.initial_capacity > MAX_SLOTS {
            return Err(ConfigError::InvalidCapacity(format!(
                "initial_capacity must be <= {}",
                MAX_SLOTS
            )));
        }

        Ok(())
    }

    /// Defaults, overridden by any `LAMA_GC_*` variables that are set
    ///
    /// Recognised variables:
    /// - LAMA_GC_THRESHOLD
    /// - LAMA_GC_MAX_HEAP
    /// - LAMA_GC_GROWTH
    /// - LAMA_GC_AUTO
    /// - LAMA_GC_VERBOSE
    ///
    /// Unparseable values are ignored.
    ///
    /// ```bash
    /// export LAMA_GC_MAX_HEAP=67108864  # 64MB
    /// export LAMA_GC_VERBOSE=1
    /// ```
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(size) = lookup("LAMA_GC_THRESHOLD").and_then(|v| v.parse::<usize>().ok()) {
            config.collect_threshold = size;
        }

        if let Some(size) = lookup("LAMA_GC_MAX_HEAP").and_then(|v| v.parse::<usize>().ok()) {
            config.max_heap_bytes = size;
        }

        if let Some(factor) = lookup("LAMA_GC_GROWTH").and_then(|v| v.parse::<f64>().ok()) {
            config.growth_factor = factor;
        }

        if let Some(val) = lookup("LAMA_GC_AUTO") {
            config.auto_collect = parse_flag(&val);
        }

        if let Some(val) = lookup("LAMA_GC_VERBOSE") {
            config.verbose = parse_flag(&val);
        }

        config
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

/// Why a `GcConfig` was rejected
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid heap size: {0}")]
    InvalidHeapSize(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Invalid growth factor: {0}")]
    InvalidGrowthFactor(String),

    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),
}

const MB: usize = 1024 * 1024;

/// Largest object table the reference encoding can address (31 index bits)
pub const MAX_SLOTS: usize = 1 << 31;
