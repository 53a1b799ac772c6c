//! C ABI for compiled Lama programs
//!
//! Entry points keep the Lama runtime names. Values cross the boundary as
//! raw 64-bit words (`Value` is `repr(transparent)` over `i64`).
//!
//! Variadic constructors take the element count followed by a pointer to
//! that many words instead of a C variadic tail.
//!
//! Any failure is fatal: it is logged, printed as `*** FAILURE: <message>`
//! and the process exits with status 1.
//!
//! The C stack is not scanned. Objects returned from this interface are not
//! pinned by any handle scope: a value the caller still needs when it next
//! allocates must be kept in `__gc_register_root` until it is done with it.
//! Arguments of an allocating call are safe for the duration of that call.

#![allow(non_snake_case)]

use crate::error::{Result, RuntimeError};
use crate::global;
use crate::io;
use crate::runtime::Runtime;
use lama_gc::Value;
use std::ffi::{c_char, CStr};
use std::fmt::Display;

fn failure(message: impl Display) -> ! {
    log::error!("{}", message);
    eprintln!("*** FAILURE: {}", message);
    std::process::exit(1)
}

fn or_fail<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => failure(err),
    }
}

fn with_global<F, R>(f: F) -> R
where
    F: FnOnce(&mut Runtime) -> Result<R>,
{
    or_fail(global::with_runtime(f))
}

/// Run an allocating call in a scope of its own, leaving the result unpinned
fn allocating<F>(f: F) -> Value
where
    F: FnOnce(&mut Runtime) -> Result<Value>,
{
    with_global(|rt| {
        let mark = rt.open_scope();
        let result = f(rt);
        rt.close_scope(mark)?;
        result
    })
}

/// Borrow `count` words starting at `ptr`
///
/// # Safety
///
/// `ptr` must point to `count` readable words when `count > 0`.
unsafe fn words<'a>(count: Value, ptr: *const Value) -> &'a [Value] {
    let n = match count.unbox().ok().and_then(|n| usize::try_from(n).ok()) {
        Some(n) => n,
        None => failure(RuntimeError::unexpected("non-negative count", count.to_string())),
    };
    if n == 0 {
        return &[];
    }
    if ptr.is_null() {
        failure(RuntimeError::InvalidInput(format!(
            "null element pointer for {} elements",
            n
        )));
    }
    std::slice::from_raw_parts(ptr, n)
}

/// Initialize the runtime (configuration from `LAMA_GC_*` variables)
#[no_mangle]
pub extern "C" fn __gc_init() {
    or_fail(global::initialize());
}

/// Run a full collection
#[no_mangle]
pub extern "C" fn __gc_collect() {
    or_fail(global::collect());
}

/// Drop the runtime and every object it owns
#[no_mangle]
pub extern "C" fn __gc_shutdown() {
    global::shutdown();
}

#[no_mangle]
pub extern "C" fn __gc_register_root(value: Value) {
    with_global(|rt| rt.register_root(value))
}

#[no_mangle]
pub extern "C" fn __gc_unregister_root(value: Value) {
    with_global(|rt| rt.unregister_root(value))
}

#[no_mangle]
pub extern "C" fn BOX(n: i64) -> Value {
    or_fail(crate::box_int(n))
}

#[no_mangle]
pub extern "C" fn UNBOX(value: Value) -> i64 {
    or_fail(crate::unbox(value))
}

/// Allocate an array of `bn` elements
///
/// # Safety
///
/// `elems` must point to `UNBOX(bn)` readable words.
#[no_mangle]
pub unsafe extern "C" fn Barray(bn: Value, elems: *const Value) -> Value {
    let elements = words(bn, elems);
    allocating(|rt| rt.make_array(bn, elements))
}

/// Allocate a string from a NUL-terminated byte string
///
/// # Safety
///
/// `s` must be a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn Bstring(s: *const c_char) -> Value {
    if s.is_null() {
        failure(RuntimeError::InvalidInput("null string".to_string()));
    }
    let bytes = CStr::from_ptr(s).to_bytes();
    allocating(|rt| rt.make_bytes(bytes))
}

/// Boxed tag id for a NUL-terminated constructor name
///
/// # Safety
///
/// `name` must be a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn LtagHash(name: *const c_char) -> Value {
    if name.is_null() {
        failure(RuntimeError::InvalidInput("null tag name".to_string()));
    }
    let name = CStr::from_ptr(name).to_string_lossy();
    with_global(|rt| Ok(rt.tag_of(&name)))
}

/// Allocate an S-expression with `bn` fields and tag id `tag`
///
/// # Safety
///
/// `fields` must point to `UNBOX(bn)` readable words.
#[no_mangle]
pub unsafe extern "C" fn Bsexp(bn: Value, fields: *const Value, tag: Value) -> Value {
    let fields = words(bn, fields);
    allocating(|rt| rt.make_sexp_tagged(tag, fields))
}

/// Allocate a closure with `bn` captured values
///
/// # Safety
///
/// `captures` must point to `UNBOX(bn)` readable words.
#[no_mangle]
pub unsafe extern "C" fn Bclosure(bn: Value, entry: Value, captures: *const Value) -> Value {
    let captures = words(bn, captures);
    allocating(|rt| rt.make_closure(entry, captures))
}

#[no_mangle]
pub extern "C" fn Belem(p: Value, i: Value) -> Value {
    with_global(|rt| rt.element_at(p, i))
}

#[no_mangle]
pub extern "C" fn Bsta(v: Value, i: Value, x: Value) -> Value {
    with_global(|rt| rt.store_element(x, i, v))
}

#[no_mangle]
pub extern "C" fn Llength(p: Value) -> Value {
    with_global(|rt| rt.length(p))
}

#[no_mangle]
pub extern "C" fn Lstring(p: Value) -> Value {
    allocating(|rt| rt.stringify(p))
}

#[no_mangle]
pub extern "C" fn Lwrite(n: Value) -> Value {
    let stdout = std::io::stdout();
    or_fail(io::write_int(&mut stdout.lock(), n))
}

#[no_mangle]
pub extern "C" fn Lread() -> Value {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    or_fail(io::read_int(&mut stdin.lock(), &mut stdout.lock()))
}

#[no_mangle]
pub extern "C" fn Btag(d: Value, t: Value, n: Value) -> Value {
    with_global(|rt| Ok(rt.tag_matches(d, t, n)))
}

#[no_mangle]
pub extern "C" fn Barray_patt(d: Value, n: Value) -> Value {
    with_global(|rt| Ok(rt.array_pattern(d, n)))
}

#[no_mangle]
pub extern "C" fn Bstring_patt(x: Value, y: Value) -> Value {
    with_global(|rt| Ok(rt.string_pattern(x, y)))
}

#[no_mangle]
pub extern "C" fn Bboxed_patt(x: Value) -> Value {
    with_global(|rt| Ok(rt.is_boxed(x)))
}

#[no_mangle]
pub extern "C" fn Bunboxed_patt(x: Value) -> Value {
    with_global(|rt| Ok(rt.is_unboxed(x)))
}

#[no_mangle]
pub extern "C" fn Barray_tag_patt(x: Value) -> Value {
    with_global(|rt| Ok(rt.is_array(x)))
}

#[no_mangle]
pub extern "C" fn Bstring_tag_patt(x: Value) -> Value {
    with_global(|rt| Ok(rt.is_string(x)))
}

#[no_mangle]
pub extern "C" fn Bsexp_tag_patt(x: Value) -> Value {
    with_global(|rt| Ok(rt.is_sexp(x)))
}

#[no_mangle]
pub extern "C" fn Bclosure_tag_patt(x: Value) -> Value {
    with_global(|rt| Ok(rt.is_closure(x)))
}
