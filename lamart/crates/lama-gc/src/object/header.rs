//! Object Header - Metadata for GC-managed objects
//!
//! Header layout (16 bytes accounted per object):
//! ┌─────────────────────────────────────────┐
//! │   Kind tag (Lama object tag, 4 bytes)   │
//! │   Mark flag                             │
//! ├─────────────────────────────────────────┤
//! │   Size (8 bytes, incl. header)          │
//! └─────────────────────────────────────────┘
//!
//! The kind tags are the odd constants the Lama runtime stores in its
//! object headers, so they round-trip through the C ABI unchanged.

use std::fmt;

/// Accounted size of an object header in bytes
pub const HEADER_SIZE: usize = 16;

/// Accounted size of one payload word in bytes
pub const WORD_SIZE: usize = std::mem::size_of::<i64>();

/// Heap object kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ObjectKind {
    String = 0x0000_0001,
    Array = 0x0000_0003,
    Sexp = 0x0000_0005,
    Closure = 0x0000_0007,
}

impl ObjectKind {
    /// Raw Lama tag value
    pub const fn tag(self) -> i32 {
        self as i32
    }

    /// Kind from a raw Lama tag value
    pub const fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0x1 => Some(ObjectKind::String),
            0x3 => Some(ObjectKind::Array),
            0x5 => Some(ObjectKind::Sexp),
            0x7 => Some(ObjectKind::Closure),
            _ => None,
        }
    }

    /// Lowercase name used in error messages
    pub const fn name(self) -> &'static str {
        match self {
            ObjectKind::String => "string",
            ObjectKind::Array => "array",
            ObjectKind::Sexp => "sexp",
            ObjectKind::Closure => "closure",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Object Header
///
/// Every heap object carries one. The collector owns the mark flag; the size
/// feeds heap accounting and the collection threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHeader {
    /// Object kind
    pub kind: ObjectKind,
    /// Reached during the current mark phase
    pub marked: bool,
    /// Object size in bytes (including header)
    pub size: usize,
}

impl ObjectHeader {
    pub fn new(kind: ObjectKind, size: usize) -> Self {
        Self {
            kind,
            marked: false,
            size,
        }
    }

    /// Set the mark flag
    /// Returns true if it was already set
    #[inline]
    pub fn set_marked(&mut self) -> bool {
        std::mem::replace(&mut self.marked, true)
    }

    #[inline]
    pub fn clear_mark(&mut self) {
        self.marked = false;
    }
}
