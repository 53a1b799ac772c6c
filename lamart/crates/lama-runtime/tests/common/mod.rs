//! Shared fixtures for lama-runtime integration tests

#![allow(dead_code)]

use lama_runtime::{box_int, GcConfig, Runtime, Value};
use parking_lot::{Mutex, MutexGuard};

/// Serializes tests that touch the process-wide runtime
static GLOBAL_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Hold the global lock and start from a fresh global runtime
pub fn fresh_global() -> MutexGuard<'static, ()> {
    let guard = GLOBAL_LOCK.lock();
    lama_runtime::shutdown();
    guard
}

/// Runtime that only collects when asked to
pub fn manual_runtime() -> Runtime {
    Runtime::new(GcConfig {
        auto_collect: false,
        ..Default::default()
    })
    .expect("default configuration is valid")
}

/// Runtime with a small automatic collection threshold
pub fn eager_runtime() -> Runtime {
    Runtime::new(GcConfig {
        collect_threshold: 1024,
        ..Default::default()
    })
    .expect("small threshold configuration is valid")
}

/// Boxed integer shorthand
pub fn b(n: i64) -> Value {
    box_int(n).expect("test integers fit")
}

/// Unboxed view of an array of integers
#[track_caller]
pub fn ints(rt: &Runtime, array: Value) -> Vec<i64> {
    let len = lama_runtime::unbox(rt.length(array).expect("length")).expect("boxed length");
    (0..len)
        .map(|i| {
            let item = rt.element_at(array, b(i)).expect("element in range");
            lama_runtime::unbox(item).expect("integer element")
        })
        .collect()
}
