//! Root Set - Registered Roots and Handle Scopes
//!
//! Two sources keep objects alive across a collection:
//!
//! - **Registered roots**: explicit, reference-counted registrations made by
//!   the embedder (globals, interpreter stacks).
//! - **Handle scopes**: a stack of values pinned by allocation. Every fresh
//!   object is pushed onto the innermost scope, so a value returned by an
//!   allocation survives until its scope is closed.
//!
//! ```text
//! handles: [ a b | c d e | f ]
//!                ^       ^
//!            scope 1  scope 2 (innermost)
//! ```
//!
//! The bottom scope is never closed.

use crate::error::{GcError, Result};
use crate::value::Value;
use indexmap::IndexMap;

/// Marker returned by `open_scope`, consumed by `close_scope`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a handle scope must be closed with its mark"]
pub struct ScopeMark {
    depth: usize,
    base: usize,
}

impl ScopeMark {
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Root set scanned at the start of every collection
#[derive(Debug, Default)]
pub struct RootSet {
    /// Registered roots with registration counts
    registered: IndexMap<Value, usize>,
    /// Pinned handles, innermost scope last
    handles: Vec<Value>,
    /// Start offset of each open scope in `handles`
    scope_bases: Vec<usize>,
}

impl RootSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root
    ///
    /// Registering the same value twice requires two unregistrations.
    /// Integers need no rooting and are ignored.
    pub fn register(&mut self, value: Value) {
        if value.is_int() {
            return;
        }
        *self.registered.entry(value).or_insert(0) += 1;
    }

    /// Unregister a root
    pub fn unregister(&mut self, value: Value) -> Result<()> {
        if value.is_int() {
            return Ok(());
        }

        match self.registered.get_mut(&value) {
            Some(count) if *count > 1 => {
                *count -= 1;
                Ok(())
            }
            Some(_) => {
                self.registered.swap_remove(&value);
                Ok(())
            }
            None => Err(GcError::RootNotRegistered { word: value.raw() }),
        }
    }

    pub fn is_registered(&self, value: Value) -> bool {
        self.registered.contains_key(&value)
    }

    /// Number of distinct registered roots
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    /// Pin a value in the innermost scope
    pub fn pin(&mut self, value: Value) {
        if value.is_ref() {
            self.handles.push(value);
        }
    }

    /// Open a nested handle scope
    pub fn open_scope(&mut self) -> ScopeMark {
        let base = self.handles.len();
        self.scope_bases.push(base);
        ScopeMark {
            depth: self.scope_bases.len(),
            base,
        }
    }

    /// Close the innermost scope, unpinning everything allocated in it
    pub fn close_scope(&mut self, mark: ScopeMark) -> Result<()> {
        let current = self.scope_bases.len();
        if mark.depth != current || self.scope_bases.last() != Some(&mark.base) {
            return Err(GcError::InvalidScope {
                depth: mark.depth,
                current,
            });
        }

        self.scope_bases.pop();
        self.handles.truncate(mark.base);
        Ok(())
    }

    /// Close the innermost scope, keeping `value` pinned in the parent
    pub fn close_scope_escaping(&mut self, mark: ScopeMark, value: Value) -> Result<Value> {
        self.close_scope(mark)?;
        self.pin(value);
        Ok(value)
    }

    /// Depth of the innermost open scope (0 = bottom scope)
    pub fn scope_depth(&self) -> usize {
        self.scope_bases.len()
    }

    /// Number of pinned handles across all scopes
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    /// Every root value: registered roots, then pinned handles
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        self.registered
            .keys()
            .copied()
            .chain(self.handles.iter().copied())
    }
}
