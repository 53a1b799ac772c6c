//! Runtime - Lama builtins over the collected heap
//!
//! `Runtime` pairs a `GarbageCollector` with the sexp tag table and exposes
//! the operations compiled Lama code calls: constructors, element access,
//! length, pattern tests and rendering.
//!
//! Every value a caller passes in must be an integer or a live reference;
//! dangling references are rejected with the collector's error instead of
//! being stored.

use crate::error::{Result, RuntimeError};
use crate::render;
use crate::tags::TagTable;
use lama_gc::stats::GcSummary;
use lama_gc::{
    CollectionReport, GarbageCollector, GcConfig, GcReason, HeapObject, ObjectBody, ScopeMark,
    Value,
};

/// Encode a native integer as a boxed value
///
/// # Examples
///
/// ```rust
/// use lama_runtime::{box_int, unbox};
///
/// let v = box_int(-3)?;
/// assert_eq!(unbox(v)?, -3);
/// # Ok::<(), lama_runtime::RuntimeError>(())
/// ```
pub fn box_int(n: i64) -> Result<Value> {
    Ok(Value::box_int(n)?)
}

/// Decode a boxed integer
pub fn unbox(value: Value) -> Result<i64> {
    Ok(value.unbox()?)
}

fn flag(matches: bool) -> Value {
    Value::box_wrapping(matches as i64)
}

/// Runtime - heap, tags and builtins for one Lama program
#[derive(Debug)]
pub struct Runtime {
    gc: GarbageCollector,
    tags: TagTable,
}

impl Runtime {
    /// Create a runtime with the given collector configuration
    pub fn new(config: GcConfig) -> Result<Self> {
        log::debug!(
            "creating runtime: threshold {} bytes, heap limit {} bytes",
            config.collect_threshold,
            config.max_heap_bytes
        );
        Ok(Self {
            gc: GarbageCollector::new(config)?,
            tags: TagTable::new(),
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(GcConfig::default())
    }

    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Allocate an array of `count` elements (`Barray`)
    ///
    /// `count` is boxed and must equal `elements.len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lama_runtime::{box_int, unbox, Runtime};
    ///
    /// let mut rt = Runtime::with_defaults()?;
    /// let elems = [box_int(1)?, box_int(2)?, box_int(3)?];
    /// let array = rt.make_array(box_int(3)?, &elems)?;
    /// assert_eq!(unbox(rt.element_at(array, box_int(1)?)?)?, 2);
    /// # Ok::<(), lama_runtime::RuntimeError>(())
    /// ```
    pub fn make_array(&mut self, count: Value, elements: &[Value]) -> Result<Value> {
        let declared = count
            .unbox()
            .map_err(|_| RuntimeError::unexpected("int count", self.describe(count)))?;
        if usize::try_from(declared).ok() != Some(elements.len()) {
            return Err(RuntimeError::ArityMismatch {
                declared,
                provided: elements.len(),
            });
        }

        self.check_live(elements)?;
        Ok(self.gc.allocate(ObjectBody::Array(elements.to_vec()))?)
    }

    /// Allocate a string (`Bstring`)
    pub fn make_string(&mut self, text: &str) -> Result<Value> {
        self.make_bytes(text.as_bytes())
    }

    /// Allocate a string from raw bytes
    pub fn make_bytes(&mut self, bytes: &[u8]) -> Result<Value> {
        Ok(self.gc.allocate(ObjectBody::String(bytes.to_vec()))?)
    }

    /// Allocate an S-expression, interning its tag name (`Bsexp`)
    pub fn make_sexp(&mut self, tag_name: &str, fields: &[Value]) -> Result<Value> {
        let tag = self.tag_of(tag_name);
        self.make_sexp_tagged(tag, fields)
    }

    /// Allocate an S-expression with an already interned tag
    pub fn make_sexp_tagged(&mut self, tag: Value, fields: &[Value]) -> Result<Value> {
        self.tag_name(tag)?;
        self.check_live(fields)?;
        Ok(self.gc.allocate(ObjectBody::Sexp {
            tag,
            fields: fields.to_vec(),
        })?)
    }

    /// Allocate a closure over `captures` (`Bclosure`)
    ///
    /// `entry` is the boxed code address.
    pub fn make_closure(&mut self, entry: Value, captures: &[Value]) -> Result<Value> {
        if !entry.is_int() {
            return Err(RuntimeError::unexpected("int entry", self.describe(entry)));
        }
        self.check_live(captures)?;
        Ok(self.gc.allocate(ObjectBody::Closure {
            entry,
            captures: captures.to_vec(),
        })?)
    }

    // ========================================================================
    // ELEMENT ACCESS
    // ========================================================================

    /// Read element `index` (`Belem`)
    ///
    /// Strings yield the boxed byte; closures expose the entry at index 0
    /// followed by the captures.
    pub fn element_at(&self, aggregate: Value, index: Value) -> Result<Value> {
        let object = self.object(aggregate, "array, string, sexp or closure")?;
        match &object.body {
            ObjectBody::String(bytes) => {
                let i = self.index(index, bytes.len())?;
                Ok(Value::box_wrapping(bytes[i] as i64))
            }
            ObjectBody::Array(items) => Ok(items[self.index(index, items.len())?]),
            ObjectBody::Sexp { fields, .. } => Ok(fields[self.index(index, fields.len())?]),
            ObjectBody::Closure { entry, captures } => {
                match self.index(index, captures.len() + 1)? {
                    0 => Ok(*entry),
                    i => Ok(captures[i - 1]),
                }
            }
        }
    }

    /// Overwrite element `index`, returning the stored value (`Bsta`)
    ///
    /// Storing into a string requires an integer in `0..=255`.
    pub fn store_element(&mut self, aggregate: Value, index: Value, value: Value) -> Result<Value> {
        const EXPECTED: &str = "array, string or sexp";

        let (is_string, length) = match &self.object(aggregate, EXPECTED)?.body {
            ObjectBody::String(bytes) => (true, bytes.len()),
            ObjectBody::Array(items) => (false, items.len()),
            ObjectBody::Sexp { fields, .. } => (false, fields.len()),
            ObjectBody::Closure { .. } => {
                return Err(RuntimeError::unexpected(EXPECTED, "closure"));
            }
        };
        let i = self.index(index, length)?;

        let byte = if is_string {
            match value.unbox().ok().and_then(|n| u8::try_from(n).ok()) {
                Some(byte) => byte,
                None => return Err(RuntimeError::unexpected("byte", self.describe(value))),
            }
        } else {
            self.check_live(&[value])?;
            0
        };

        self.gc.update(aggregate, |body| {
            match body {
                ObjectBody::String(bytes) => bytes[i] = byte,
                ObjectBody::Array(items) => items[i] = value,
                ObjectBody::Sexp { fields, .. } => fields[i] = value,
                ObjectBody::Closure { .. } => {}
            }
            Ok(())
        })?;

        Ok(value)
    }

    /// Number of elements of a string, array or sexp (`Llength`)
    pub fn length(&self, value: Value) -> Result<Value> {
        const EXPECTED: &str = "array, string or sexp";

        let len = match &self.object(value, EXPECTED)?.body {
            ObjectBody::String(bytes) => bytes.len(),
            ObjectBody::Array(items) => items.len(),
            ObjectBody::Sexp { fields, .. } => fields.len(),
            ObjectBody::Closure { .. } => {
                return Err(RuntimeError::unexpected(EXPECTED, "closure"));
            }
        };
        Ok(Value::box_wrapping(len as i64))
    }

    // ========================================================================
    // TAGS
    // ========================================================================

    /// Boxed id of a sexp constructor name, interning it on first use
    pub fn tag_of(&mut self, name: &str) -> Value {
        Value::box_wrapping(self.tags.intern(name))
    }

    /// Constructor name of a boxed tag id
    pub fn tag_name(&self, tag: Value) -> Result<&str> {
        let id = tag
            .unbox()
            .map_err(|_| RuntimeError::unexpected("int tag", self.describe(tag)))?;
        self.tags.name(id).ok_or(RuntimeError::UnknownTag(id))
    }

    pub fn tags(&self) -> &TagTable {
        &self.tags
    }

    // ========================================================================
    // PATTERNS
    //
    // Each returns boxed 1 or 0 and never fails on a value of the wrong kind.
    // ========================================================================

    /// Sexp with the given tag and field count (`Btag`)
    pub fn tag_matches(&self, value: Value, tag: Value, arity: Value) -> Value {
        flag(match self.body(value) {
            Some(ObjectBody::Sexp { tag: t, fields }) => {
                *t == tag && arity.unbox().ok() == Some(fields.len() as i64)
            }
            _ => false,
        })
    }

    /// Array of the given length (`Barray_patt`)
    pub fn array_pattern(&self, value: Value, length: Value) -> Value {
        flag(match self.body(value) {
            Some(ObjectBody::Array(items)) => length.unbox().ok() == Some(items.len() as i64),
            _ => false,
        })
    }

    /// Two strings with equal contents (`Bstring_patt`)
    pub fn string_pattern(&self, value: Value, other: Value) -> Value {
        flag(match (self.body(value), self.body(other)) {
            (Some(ObjectBody::String(a)), Some(ObjectBody::String(b))) => a == b,
            _ => false,
        })
    }

    pub fn is_array(&self, value: Value) -> Value {
        flag(matches!(self.body(value), Some(ObjectBody::Array(_))))
    }

    pub fn is_string(&self, value: Value) -> Value {
        flag(matches!(self.body(value), Some(ObjectBody::String(_))))
    }

    pub fn is_sexp(&self, value: Value) -> Value {
        flag(matches!(self.body(value), Some(ObjectBody::Sexp { .. })))
    }

    pub fn is_closure(&self, value: Value) -> Value {
        flag(matches!(self.body(value), Some(ObjectBody::Closure { .. })))
    }

    pub fn is_boxed(&self, value: Value) -> Value {
        flag(value.is_ref())
    }

    pub fn is_unboxed(&self, value: Value) -> Value {
        flag(value.is_int())
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    /// Text rendering of a value
    pub fn render(&self, value: Value) -> String {
        render::render(&self.gc, &self.tags, value)
    }

    /// Render a value into a new string object (`Lstring`)
    pub fn stringify(&mut self, value: Value) -> Result<Value> {
        let text = self.render(value);
        self.make_string(&text)
    }

    // ========================================================================
    // MEMORY MANAGEMENT
    // ========================================================================

    /// Run a full collection
    pub fn collect(&mut self) -> CollectionReport {
        self.gc.collect(GcReason::Explicit)
    }

    /// Keep `value` alive outside any handle scope
    pub fn register_root(&mut self, value: Value) -> Result<()> {
        Ok(self.gc.register_root(value)?)
    }

    pub fn unregister_root(&mut self, value: Value) -> Result<()> {
        Ok(self.gc.unregister_root(value)?)
    }

    pub fn open_scope(&mut self) -> ScopeMark {
        self.gc.open_scope()
    }

    pub fn close_scope(&mut self, mark: ScopeMark) -> Result<()> {
        Ok(self.gc.close_scope(mark)?)
    }

    pub fn close_scope_escaping(&mut self, mark: ScopeMark, value: Value) -> Result<Value> {
        Ok(self.gc.close_scope_escaping(mark, value)?)
    }

    /// Run `f` in a fresh handle scope; its result stays pinned in the parent
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

    pub fn gc(&self) -> &GarbageCollector {
        &self.gc
    }

    pub fn summary(&self) -> GcSummary {
        self.gc.summary()
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn object(&self, value: Value, expected: &str) -> Result<&HeapObject> {
        if value.is_int() {
            return Err(RuntimeError::unexpected(expected, self.describe(value)));
        }
        Ok(self.gc.get(value)?)
    }

    fn body(&self, value: Value) -> Option<&ObjectBody> {
        if value.is_int() {
            return None;
        }
        self.gc.get(value).ok().map(|object| &object.body)
    }

    /// Validate a boxed index against `length`
    fn index(&self, index: Value, length: usize) -> Result<usize> {
        let i = index
            .unbox()
            .map_err(|_| RuntimeError::unexpected("int index", self.describe(index)))?;
        usize::try_from(i)
            .ok()
            .filter(|&i| i < length)
            .ok_or(RuntimeError::IndexOutOfRange { index: i, length })
    }

    fn check_live(&self, values: &[Value]) -> Result<()> {
        for value in values.iter().filter(|v| v.is_ref()) {
            self.gc.get(*value)?;
        }
        Ok(())
    }

    /// Short description of a value for error messages
    fn describe(&self, value: Value) -> String {
        if value.is_int() {
            return format!("int {}", value);
        }
        match self.gc.get(value) {
            Ok(object) => object.kind().to_string(),
            Err(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lama_gc::GcError;

    fn rt() -> Runtime {
        Runtime::new(GcConfig {
            auto_collect: false,
            ..Default::default()
        })
        .unwrap()
    }

    fn b(n: i64) -> Value {
        box_int(n).unwrap()
    }

    #[test]
    fn test_box_unbox() {
        for n in [0, 1, -1, 42, Value::MIN_INT, Value::MAX_INT] {
            assert_eq!(unbox(box_int(n).unwrap()).unwrap(), n);
        }
        assert!(matches!(
            box_int(Value::MAX_INT + 1),
            Err(RuntimeError::Gc(GcError::IntegerOutOfRange(_)))
        ));
    }

    #[test]
    fn test_element_at_reference_case() {
        let mut rt = rt();
        let array = rt.make_array(b(3), &[b(1), b(2), b(3)]).unwrap();
        assert_eq!(unbox(rt.element_at(array, b(1)).unwrap()).unwrap(), 2);
    }

    #[test]
    fn test_make_array_arity() {
        let mut rt = rt();
        assert!(matches!(
            rt.make_array(b(3), &[b(1)]),
            Err(RuntimeError::ArityMismatch {
                declared: 3,
                provided: 1
            })
        ));
        assert!(matches!(
            rt.make_array(b(-1), &[]),
            Err(RuntimeError::ArityMismatch { .. })
        ));
        let empty = rt.make_array(b(0), &[]).unwrap();
        assert_eq!(rt.length(empty).unwrap(), b(0));
    }

    #[test]
    fn test_index_errors() {
        let mut rt = rt();
        let array = rt.make_array(b(2), &[b(5), b(6)]).unwrap();

        assert!(matches!(
            rt.element_at(array, b(2)),
            Err(RuntimeError::IndexOutOfRange {
                index: 2,
                length: 2
            })
        ));
        assert!(matches!(
            rt.element_at(array, b(-1)),
            Err(RuntimeError::IndexOutOfRange { index: -1, .. })
        ));
        assert!(matches!(
            rt.element_at(array, array),
            Err(RuntimeError::UnexpectedValue { .. })
        ));
        assert!(matches!(
            rt.element_at(b(7), b(0)),
            Err(RuntimeError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn test_closure_elements() {
        let mut rt = rt();
        let s = rt.make_string("env").unwrap();
        let closure = rt.make_closure(b(0x100), &[s]).unwrap();

        assert_eq!(rt.element_at(closure, b(0)).unwrap(), b(0x100));
        assert_eq!(rt.element_at(closure, b(1)).unwrap(), s);
        assert!(rt.make_closure(s, &[]).is_err());
        assert!(rt.length(closure).is_err());
    }

    #[test]
    fn test_store_element() {
        let mut rt = rt();
        let array = rt.make_array(b(2), &[b(0), b(0)]).unwrap();
        let s = rt.make_string("abc").unwrap();

        assert_eq!(rt.store_element(array, b(1), s).unwrap(), s);
        assert_eq!(rt.element_at(array, b(1)).unwrap(), s);

        rt.store_element(s, b(0), b(b'x' as i64)).unwrap();
        assert_eq!(rt.render(s), "\"xbc\"");
        assert!(rt.store_element(s, b(0), b(256)).is_err());
        assert!(rt.store_element(s, b(0), array).is_err());
    }

    #[test]
    fn test_sexp_and_tags() {
        let mut rt = rt();
        let nil = rt.make_sexp("Nil", &[]).unwrap();
        let cons = rt.make_sexp("Cons", &[b(1), nil]).unwrap();
        let cons_tag = rt.tag_of("Cons");

        assert_eq!(rt.tag_name(cons_tag).unwrap(), "Cons");
        assert_eq!(rt.length(cons).unwrap(), b(2));
        assert_eq!(rt.tag_matches(cons, cons_tag, b(2)), b(1));
        assert_eq!(rt.tag_matches(cons, cons_tag, b(1)), b(0));
        assert_eq!(rt.tag_matches(nil, cons_tag, b(0)), b(0));
        assert!(matches!(
            rt.make_sexp_tagged(b(99), &[]),
            Err(RuntimeError::UnknownTag(99))
        ));
    }

    #[test]
    fn test_patterns_never_fail() {
        let mut rt = rt();
        let s = rt.make_string("a").unwrap();
        let t = rt.make_string("a").unwrap();
        let array = rt.make_array(b(1), &[s]).unwrap();

        assert_eq!(rt.string_pattern(s, t), b(1));
        assert_eq!(rt.string_pattern(s, array), b(0));
        assert_eq!(rt.array_pattern(array, b(1)), b(1));
        assert_eq!(rt.array_pattern(b(3), b(1)), b(0));
        assert_eq!(rt.is_array(array), b(1));
        assert_eq!(rt.is_string(array), b(0));
        assert_eq!(rt.is_sexp(b(0)), b(0));
        assert_eq!(rt.is_boxed(s), b(1));
        assert_eq!(rt.is_unboxed(b(5)), b(1));
    }

    #[test]
    fn test_stale_value_rejected() {
        let mut rt = rt();
        let mark = rt.open_scope();
        let s = rt.make_string("gone").unwrap();
        rt.close_scope(mark).unwrap();
        rt.collect();

        assert!(matches!(
            rt.make_array(b(1), &[s]),
            Err(RuntimeError::Gc(GcError::StaleReference { .. }))
        ));
        assert_eq!(rt.is_string(s), b(0));
    }

    #[test]
    fn test_stringify() {
        let mut rt = rt();
        let array = rt.make_array(b(2), &[b(1), b(2)]).unwrap();
        let text = rt.stringify(array).unwrap();

        assert_eq!(rt.render(text), "\"[1, 2]\"");
        assert_eq!(rt.length(text).unwrap(), b(6));
    }
}
