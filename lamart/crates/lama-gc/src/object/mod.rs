//! Object Module - GC-managed object model
//!
//! A heap object is a header plus one of the four Lama payload shapes.

pub mod header;

pub use header::{ObjectHeader, ObjectKind, HEADER_SIZE, WORD_SIZE};

use crate::value::Value;

/// Payload of a heap object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBody {
    /// Byte string
    String(Vec<u8>),
    /// Ordered sequence of values
    Array(Vec<Value>),
    /// Tagged constructor application; `tag` is a boxed tag id
    Sexp { tag: Value, fields: Vec<Value> },
    /// Code entry plus captured values
    Closure { entry: Value, captures: Vec<Value> },
}

impl ObjectBody {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectBody::String(_) => ObjectKind::String,
            ObjectBody::Array(_) => ObjectKind::Array,
            ObjectBody::Sexp { .. } => ObjectKind::Sexp,
            ObjectBody::Closure { .. } => ObjectKind::Closure,
        }
    }

    /// Accounted size in bytes, header included
    pub fn estimate_size(&self) -> usize {
        let payload = match self {
            ObjectBody::String(bytes) => bytes.len(),
            ObjectBody::Array(items) => items.len() * WORD_SIZE,
            ObjectBody::Sexp { fields, .. } => (fields.len() + 1) * WORD_SIZE,
            ObjectBody::Closure { captures, .. } => (captures.len() + 1) * WORD_SIZE,
        };
        HEADER_SIZE + payload
    }

    /// Every value slot the object holds, in index order
    ///
    /// Strings hold none. A closure's entry is slot 0.
    pub fn values(&self) -> Box<dyn Iterator<Item = Value> + '_> {
        match self {
            ObjectBody::String(_) => Box::new(std::iter::empty()),
            ObjectBody::Array(items) => Box::new(items.iter().copied()),
            ObjectBody::Sexp { tag, fields } => {
                Box::new(std::iter::once(*tag).chain(fields.iter().copied()))
            }
            ObjectBody::Closure { entry, captures } => {
                Box::new(std::iter::once(*entry).chain(captures.iter().copied()))
            }
        }
    }

    /// Reference words held by the object (tracing edges)
    pub fn children(&self) -> impl Iterator<Item = Value> + '_ {
        self.values().filter(|v| v.is_ref())
    }
}

/// A header plus payload, as stored in an object table slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapObject {
    pub header: ObjectHeader,
    pub body: ObjectBody,
}

impl HeapObject {
    pub fn new(body: ObjectBody) -> Self {
        let header = ObjectHeader::new(body.kind(), body.estimate_size());
        Self { header, body }
    }

    #[inline]
    pub fn kind(&self) -> ObjectKind {
        self.header.kind
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.header.size
    }

    /// Recompute the accounted size after an in-place payload change
    pub fn refresh_size(&mut self) -> usize {
        self.header.size = self.body.estimate_size();
        self.header.size
    }
}
