//! GC Core Module - Allocation and Collection Cycle Management
//!
//! `GarbageCollector` owns the object table, the root set and the statistics.
//! Collection is stop-the-world mark-sweep: objects never move, so a `Value`
//! stays valid for as long as its object is reachable.
//!
//! Collection is triggered by:
//! - the allocation threshold (bytes allocated since the last cycle), when
//!   `auto_collect` is on
//! - the hard heap limit, before reporting `OutOfMemory`
//! - an explicit `collect` call

use crate::config::GcConfig;
use crate::error::{GcError, Result};
use crate::heap::Heap;
use crate::logging::{self, GcEvent};
use crate::marker::{Marker, RootSet, ScopeMark};
use crate::object::{HeapObject, ObjectBody};
use crate::stats::{GcStats, GcSummary};
use crate::value::Value;
use std::fmt;
use std::time::{Duration, Instant};

/// Reason for GC trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GcReason {
    /// Bytes allocated since the last cycle crossed the threshold
    Threshold { allocated: usize, threshold: usize },
    /// An allocation would exceed the hard heap limit
    HeapLimit { requested: usize },
    /// Explicit GC request (user call)
    Explicit,
}

impl fmt::Display for GcReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GcReason::Threshold {
                allocated,
                threshold,
            } => write!(f, "threshold ({}/{} bytes)", allocated, threshold),
            GcReason::HeapLimit { requested } => write!(f, "heap limit ({} bytes requested)", requested),
            GcReason::Explicit => f.write_str("explicit"),
        }
    }
}

/// Outcome of one collection cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    pub cycle: u64,
    pub freed_objects: usize,
    pub freed_bytes: usize,
    pub live_objects: usize,
    pub live_bytes: usize,
    pub duration: Duration,
}

/// GarbageCollector - allocator and collector for Lama heap objects
///
/// Single-owner: every operation takes `&self` or `&mut self`, and callers
/// that share a collector wrap it in a lock.
pub struct GarbageCollector {
    heap: Heap,
    roots: RootSet,
    marker: Marker,
    config: GcConfig,
    stats: GcStats,
    cycle_count: u64,
    /// Bytes allocated since the last cycle
    bytes_since_gc: usize,
    /// Allocation volume that triggers the next automatic cycle
    threshold: usize,
}

impl GarbageCollector {
    /// Create a new GarbageCollector with specified configuration
    ///
    /// # Examples
    /// ```rust
    /// use lama_gc::{GarbageCollector, GcConfig, ObjectBody, Value};
    ///
    /// let mut gc = GarbageCollector::new(GcConfig::default())?;
    /// let array = gc.allocate(ObjectBody::Array(vec![Value::box_int(1)?]))?;
    /// assert!(array.is_ref());
    /// # Ok::<(), lama_gc::GcError>(())
    /// ```
    pub fn new(config: GcConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            heap: Heap::with_capacity(config.initial_capacity),
            roots: RootSet::new(),
            marker: Marker::new(),
            stats: GcStats::new(),
            cycle_count: 0,
            bytes_since_gc: 0,
            threshold: config.collect_threshold,
            config,
        })
    }

    /// Allocate a heap object
    ///
    /// The object's own references are kept alive across any collection this
    /// allocation triggers, and the returned value is pinned in the innermost
    /// handle scope.
    pub fn allocate(&mut self, body: ObjectBody) -> Result<Value> {
        let size = body.estimate_size();

        if self.config.auto_collect && self.bytes_since_gc + size > self.threshold {
            let reason = GcReason::Threshold {
                allocated: self.bytes_since_gc + size,
                threshold: self.threshold,
            };
            let pending: Vec<Value> = body.children().collect();
            self.collect_with(reason, pending);
        }

        if self.heap.live_bytes() + size > self.config.max_heap_bytes {
            let pending: Vec<Value> = body.children().collect();
            self.collect_with(GcReason::HeapLimit { requested: size }, pending);

            let used = self.heap.live_bytes();
            if used + size > self.config.max_heap_bytes {
                log::warn!(
                    "allocation of {} bytes failed: {} of {} bytes live",
                    size,
                    used,
                    self.config.max_heap_bytes
                );
                if self.config.verbose {
                    logging::record(GcEvent::OutOfMemory {
                        requested: size,
                        live_bytes: used,
                    });
                }
                return Err(GcError::OutOfMemory {
                    requested: size,
                    available: self.config.max_heap_bytes.saturating_sub(used),
                });
            }
        }

        let obj_ref = self.heap.insert(HeapObject::new(body))?;
        let value = Value::from_ref(obj_ref);

        self.bytes_since_gc += size;
        self.roots.pin(value);
        if self.config.stats_enabled {
            self.stats
                .record_allocation(size, self.heap.live_objects(), self.heap.live_bytes());
        }

        Ok(value)
    }

    /// Run a full collection cycle
    pub fn collect(&mut self, reason: GcReason) -> CollectionReport {
        self.collect_with(reason, Vec::new())
    }

    fn collect_with(&mut self, reason: GcReason, extra_roots: Vec<Value>) -> CollectionReport {
        let start = Instant::now();
        let cycle = self.cycle_count + 1;

        if self.config.verbose {
            logging::record(GcEvent::CollectionStarted {
                cycle,
                reason: reason.to_string(),
            });
        }

        let roots = self.roots.iter().chain(extra_roots);
        let mark_stats = self.marker.mark(&mut self.heap, roots);
        let (freed_objects, freed_bytes) = self.heap.sweep();

        let live_objects = self.heap.live_objects();
        let live_bytes = self.heap.live_bytes();
        let duration = start.elapsed();

        self.cycle_count = cycle;
        self.bytes_since_gc = 0;
        self.threshold = self
            .config
            .collect_threshold
            .max((live_bytes as f64 * self.config.growth_factor) as usize);

        if self.config.stats_enabled {
            self.stats
                .record_collection(freed_objects, freed_bytes, duration);
        }

        log::debug!(
            "gc cycle {} ({}): marked {}, freed {} objects / {} bytes, {} bytes live",
            cycle,
            reason,
            mark_stats.marked,
            freed_objects,
            freed_bytes,
            live_bytes
        );

        if self.config.verbose {
            logging::record(GcEvent::Marked {
                cycle,
                marked: mark_stats.marked,
                scanned: mark_stats.scanned,
            });
            logging::record(GcEvent::CollectionFinished {
                cycle,
                pause_us: duration.as_micros() as u64,
                freed_objects,
                freed_bytes,
            });
            logging::record(GcEvent::HeapSnapshot {
                live_objects,
                live_bytes,
                limit_bytes: self.config.max_heap_bytes,
            });
        }

        CollectionReport {
            cycle,
            freed_objects,
            freed_bytes,
            live_objects,
            live_bytes,
            duration,
        }
    }

    /// Borrow the object a reference names
    pub fn get(&self, value: Value) -> Result<&HeapObject> {
        self.heap.get(value)
    }

    /// Mutate an object's payload in place
    ///
    /// Heap accounting follows any change in the payload's size. Growth here
    /// is not checked against `max_heap_bytes`; live bytes may end up above
    /// the limit, and the next allocation that needs room collects and then
    /// fails with `OutOfMemory` (`available: 0`) if the heap is still full.
    pub fn update<F, R>(&mut self, value: Value, f: F) -> Result<R>
    where
        F: FnOnce(&mut ObjectBody) -> Result<R>,
    {
        let object = self.heap.get_mut(value)?;
        let old_size = object.size();
        let result = f(&mut object.body);
        let new_size = object.refresh_size();
        if new_size != old_size {
            self.heap.adjust_live_bytes(old_size, new_size);
        }
        result
    }

    /// Check that a reference names a live object
    pub fn is_live(&self, value: Value) -> bool {
        self.heap.contains(value)
    }

    /// Register a root
    pub fn register_root(&mut self, value: Value) -> Result<()> {
        if value.is_ref() {
            self.heap.get(value)?;
        }
        self.roots.register(value);
        Ok(())
    }

    /// Unregister a root
    pub fn unregister_root(&mut self, value: Value) -> Result<()> {
        self.roots.unregister(value)
    }

    /// Open a nested handle scope
    pub fn open_scope(&mut self) -> ScopeMark {
        self.roots.open_scope()
    }

    /// Close a handle scope, unpinning everything allocated in it
    pub fn close_scope(&mut self, mark: ScopeMark) -> Result<()> {
        self.roots.close_scope(mark)
    }

    /// Close a handle scope, keeping `value` pinned in the parent scope
    pub fn close_scope_escaping(&mut self, mark: ScopeMark, value: Value) -> Result<Value> {
        self.roots.close_scope_escaping(mark, value)
    }

    /// Run `f` in a fresh handle scope; its result escapes to the parent
    pub fn scoped<F>(&mut self, f: F) -> Result<Value>
    where
        F: FnOnce(&mut Self) -> Result<Value>,
    {
        let mark = self.open_scope();
        match f(self) {
            Ok(value) => self.close_scope_escaping(mark, value),
            Err(err) => {
                self.close_scope(mark)?;
                Err(err)
            }
        }
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn roots(&self) -> &RootSet {
        &self.roots
    }

    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// Get GC cycle count
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Allocation volume that triggers the next automatic cycle
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Statistics summary including current heap occupancy
    pub fn summary(&self) -> GcSummary {
        self.stats
            .summary(self.heap.live_objects(), self.heap.live_bytes())
    }
}

impl fmt::Debug for GarbageCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GarbageCollector")
            .field("live_objects", &self.heap.live_objects())
            .field("live_bytes", &self.heap.live_bytes())
            .field("cycle_count", &self.cycle_count)
            .field("threshold", &self.threshold)
            .finish()
    }
}
