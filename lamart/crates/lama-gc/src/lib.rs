//! # lama-gc - Garbage-Collected Heap for Lama Values
//!
//! lama-gc manages the heap behind the Lama runtime: every Lama value is one
//! 64-bit word, either an unboxed integer or a reference to a heap object
//! (string, array, S-expression or closure) that the collector owns.
//!
//! ## Quick Start
//!
//! ```rust
//! use lama_gc::{GarbageCollector, GcConfig, GcReason, ObjectBody, Value};
//!
//! fn main() -> Result<(), lama_gc::GcError> {
//!     let mut gc = GarbageCollector::new(GcConfig::default())?;
//!
//!     let array = gc.allocate(ObjectBody::Array(vec![
//!         Value::box_int(1)?,
//!         Value::box_int(2)?,
//!     ]))?;
//!
//!     // Keep the array alive independently of handle scopes
//!     gc.register_root(array)?;
//!     gc.collect(GcReason::Explicit);
//!     assert!(gc.is_live(array));
//!
//!     gc.unregister_root(array)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Value Representation
//!
//! ```text
//! Integer:    [ 63 ............................ 1 | 1 ]   value = word >> 1
//! Reference:  [ generation (32) | index (31) | 0 ]
//! ```
//!
//! Generations start at 1 and change every time a slot is freed, so word 0
//! never names an object and a reference to a reclaimed object is reported as
//! stale instead of aliasing whatever reuses the slot.
//!
//! ## Collection
//!
//! Stop-the-world, non-moving mark-sweep:
//!
//! 1. **Mark**: trace from registered roots and every pinned handle
//! 2. **Sweep**: free unmarked slots, clear marks on survivors
//! 3. **Resize**: next threshold is `max(collect_threshold, live * growth_factor)`
//!
//! ## Roots
//!
//! - **Registered roots**: reference-counted, for values held outside any
//!   scope (globals, embedder state)
//! - **Handle scopes**: every fresh allocation is pinned in the innermost
//!   scope until that scope closes
//!
//! ## Modules
//!
//! - [`config`]: Collector configuration and validation
//! - [`error`]: Error types for heap operations
//! - [`gc`]: Allocation and collection cycles
//! - [`heap`]: Object table with generation-checked slots
//! - [`logging`]: Structured collector events
//! - [`marker`]: Reachability tracing and the root set
//! - [`object`]: Object kinds, headers and payloads
//! - [`stats`]: Allocation and pause statistics
//! - [`value`]: Tagged value words

// Collector
pub mod config;
pub mod error;
pub mod gc;

// Heap representation
pub mod heap;
pub mod object;
pub mod value;

// Tracing
pub mod marker;

// Monitoring
pub mod logging;
pub mod stats;

pub use config::GcConfig;
pub use error::{GcError, Result};
pub use gc::{CollectionReport, GarbageCollector, GcReason};
pub use marker::ScopeMark;
pub use object::{HeapObject, ObjectBody, ObjectKind};
pub use value::{ObjectRef, Value};

/// lama-gc version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create a collector with default configuration
///
/// # Examples
///
/// ```rust
/// let gc = lama_gc::init()?;
/// assert_eq!(gc.cycle_count(), 0);
/// # Ok::<(), lama_gc::GcError>(())
/// ```
pub fn init() -> Result<GarbageCollector> {
    GarbageCollector::new(GcConfig::default())
}

/// Create a collector with custom configuration
///
/// # Examples
///
/// ```rust
/// use lama_gc::GcConfig;
///
/// let config = GcConfig {
///     collect_threshold: 64 * 1024,
///     max_heap_bytes: 16 * 1024 * 1024,
///     ..Default::default()
/// };
///
/// let gc = lama_gc::init_with_config(config)?;
/// assert_eq!(gc.threshold(), 64 * 1024);
/// # Ok::<(), lama_gc::GcError>(())
/// ```
pub fn init_with_config(config: GcConfig) -> Result<GarbageCollector> {
    GarbageCollector::new(config)
}
