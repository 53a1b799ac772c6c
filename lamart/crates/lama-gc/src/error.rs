//! Error Module - lama-gc Error Types
//!
//! Defines all error types returned by the heap, the collector and the
//! value encoding.
//!
//! # Error Categories
//!
//! ## Memory Errors
//! - `OutOfMemory` - Heap limit reached even after a collection
//!
//! ## Value Errors
//! - `IntegerOutOfRange` - Integer does not fit the 63-bit boxed range
//! - `UnexpectedValue` - Wrong kind of word (int vs reference, wrong object kind)
//!
//! ## Reference Errors
//! - `InvalidReference` - Word names a slot that does not exist or is empty
//! - `StaleReference` - Word names a slot that was reclaimed and reused
//!
//! ## Root Errors
//! - `RootNotRegistered` - Unregistering a value that was never registered
//! - `InvalidScope` - Handle scopes closed out of order
//!
//! ## Configuration Errors
//! - `Configuration` - Invalid configuration
//! - `Internal` - Invariant violation

use thiserror::Error;

/// Main error type for all lama-gc operations
///
/// # Examples
///
/// ```rust
/// use lama_gc::GcError;
///
/// fn describe(err: &GcError) -> &'static str {
///     match err {
///         GcError::OutOfMemory { .. } => "heap exhausted",
///         GcError::StaleReference { .. } => "dangling handle",
///         _ => "other",
///     }
/// }
///
/// let err = GcError::OutOfMemory { requested: 64, available: 0 };
/// assert_eq!(describe(&err), "heap exhausted");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GcError {
    /// Out of memory - heap exhaustion
    ///
    /// **When returned:** Live bytes plus the request exceed `max_heap_bytes`
    /// after a forced collection
    ///
    /// **Recovery strategy:** Release roots and retry, or fail gracefully
    #[error("Out of memory: requested {requested} bytes, available {available} bytes")]
    OutOfMemory { requested: usize, available: usize },

    /// Integer cannot be boxed
    ///
    /// **When returned:** `Value::box_int` with a value outside
    /// `[Value::MIN_INT, Value::MAX_INT]`
    #[error("Integer {0} does not fit in a boxed word")]
    IntegerOutOfRange(i64),

    /// Word has the wrong shape for the operation
    ///
    /// **When returned:** Unboxing a reference, dereferencing an int, or
    /// asking for an array where a string lives
    #[error("Unexpected value: expected {expected}, found {found}")]
    UnexpectedValue { expected: String, found: String },

    /// Reference does not name a live slot
    ///
    /// **When returned:** Index past the end of the object table, or an
    /// empty slot
    #[error("Invalid reference: {word:#x}")]
    InvalidReference { word: i64 },

    /// Reference outlived its object
    ///
    /// **When returned:** The slot was swept and reused; the generation in
    /// the word no longer matches the slot
    #[error("Stale reference to slot {index}: generation {expected} expected, found {found}")]
    StaleReference {
        index: u32,
        expected: u32,
        found: u32,
    },

    /// Root was never registered
    #[error("Value {word:#x} is not a registered root")]
    RootNotRegistered { word: i64 },

    /// Handle scope closed out of order
    #[error("Invalid handle scope: depth {depth}, current depth {current}")]
    InvalidScope { depth: usize, current: usize },

    /// Configuration error
    ///
    /// **When returned:** `GcConfig::validate` rejected the configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error - indicates a bug in lama-gc
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GcError {
    /// Shorthand for `UnexpectedValue`
    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>) -> Self {
        GcError::UnexpectedValue {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GcError::OutOfMemory { .. } | GcError::IntegerOutOfRange(_)
        )
    }

    /// Check if this error indicates a bug in the caller or in lama-gc
    pub fn is_bug(&self) -> bool {
        matches!(
            self,
            GcError::StaleReference { .. } | GcError::InvalidScope { .. } | GcError::Internal(_)
        )
    }
}

impl From<crate::config::ConfigError> for GcError {
    fn from(err: crate::config::ConfigError) -> Self {
        GcError::Configuration(err.to_string())
    }
}

/// Result type alias for lama-gc operations
pub type Result<T> = std::result::Result<T, GcError>;
