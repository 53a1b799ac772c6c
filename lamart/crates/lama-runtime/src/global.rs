//! Process-wide runtime instance
//!
//! Compiled Lama programs and the C ABI share one `Runtime` behind a mutex.
//! `initialize` must run before any other call here; collection happens
//! under the same lock, so every mutator is stopped while it runs.

use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;
use lama_gc::{CollectionReport, GcConfig, Value};
use parking_lot::Mutex;

static RUNTIME: Mutex<Option<Runtime>> = parking_lot::const_mutex(None);

/// Initialize the global runtime with configuration from the environment
///
/// Returns `Ok(true)` when this call created the runtime and `Ok(false)` when
/// it already existed.
pub fn initialize() -> Result<bool> {
    initialize_with_config(GcConfig::from_env())
}

/// Initialize the global runtime with explicit configuration
///
/// Ignored (returns `Ok(false)`) if the runtime already exists.
pub fn initialize_with_config(config: GcConfig) -> Result<bool> {
    let mut guard = RUNTIME.lock();
    if guard.is_some() {
        log::debug!("runtime already initialized");
        return Ok(false);
    }

    *guard = Some(Runtime::new(config)?);
    log::info!("lama runtime initialized");
    Ok(true)
}

pub fn is_initialized() -> bool {
    RUNTIME.lock().is_some()
}

/// Run `f` against the global runtime
pub fn with_runtime<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&mut Runtime) -> Result<R>,
{
    let mut guard = RUNTIME.lock();
    let runtime = guard.as_mut().ok_or(RuntimeError::NotInitialized)?;
    f(runtime)
}

/// Drop the global runtime and all of its objects
///
/// Returns whether a runtime existed. A later `initialize` starts over.
pub fn shutdown() -> bool {
    let previous = RUNTIME.lock().take();
    if let Some(runtime) = &previous {
        let summary = runtime.summary();
        log::info!(
            "lama runtime shut down: {} allocations, {} collections",
            summary.allocations,
            summary.collections
        );
    }
    previous.is_some()
}

/// `make_array` on the global runtime
pub fn make_array(count: Value, elements: &[Value]) -> Result<Value> {
    with_runtime(|rt| rt.make_array(count, elements))
}

/// `element_at` on the global runtime
pub fn element_at(aggregate: Value, index: Value) -> Result<Value> {
    with_runtime(|rt| rt.element_at(aggregate, index))
}

/// Full collection on the global runtime
pub fn collect() -> Result<CollectionReport> {
    with_runtime(|rt| Ok(rt.collect()))
}
