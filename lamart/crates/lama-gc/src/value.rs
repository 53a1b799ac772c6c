//! Value Module - Tagged Machine Words
//!
//! Every value the runtime hands out is one 64-bit word:
//!
//! ```text
//! Boxed integer:
//! ┌──────────────────────────────────────────────────────┬───┐
//! │                 integer (63 bits, signed)             │ 1 │
//! └──────────────────────────────────────────────────────┴───┘
//!
//! Reference:
//! ┌────────────────────────────┬─────────────────────────┬───┐
//! │     generation (32 bits)    │    slot index (31 bits) │ 0 │
//! │            63-32            │          31-1           │ 0 │
//! └────────────────────────────┴─────────────────────────┴───┘
//! ```
//!
//! Generations start at 1, so the all-zero word never names an object.

use crate::error::{GcError, Result};
use std::fmt;

/// Low bit set on boxed integers
pub const INT_TAG: i64 = 0x1;

/// Shift separating the generation from the slot index in a reference word
const GENERATION_SHIFT: u32 = 32;

/// Mask of the index bits once the tag bit is shifted out
const INDEX_MASK: u64 = (1 << 31) - 1;

/// Handle to an object in the heap's object table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// Slot in the object table
    pub index: u32,
    /// Slot generation at allocation time
    pub generation: u32,
}

impl ObjectRef {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// A boxed value: either a small integer or a reference into the heap
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Value(i64);

impl Value {
    /// Smallest integer that survives boxing
    pub const MIN_INT: i64 = i64::MIN >> 1;

    /// Largest integer that survives boxing
    pub const MAX_INT: i64 = i64::MAX >> 1;

    /// Boxed zero
    pub const ZERO: Value = Value(INT_TAG);

    /// Box an integer
    ///
    /// Fails with `IntegerOutOfRange` when `num` is outside
    /// `[MIN_INT, MAX_INT]`.
    ///
    /// ```rust
    /// use lama_gc::Value;
    ///
    /// let v = Value::box_int(-7).unwrap();
    /// assert_eq!(v.unbox().unwrap(), -7);
    /// assert!(Value::box_int(Value::MAX_INT + 1).is_err());
    /// ```
    pub fn box_int(num: i64) -> Result<Self> {
        if !(Self::MIN_INT..=Self::MAX_INT).contains(&num) {
            return Err(GcError::IntegerOutOfRange(num));
        }
        Ok(Self::box_wrapping(num))
    }

    /// Box an integer, dropping the top bit like the C `BOX` macro
    #[inline]
    pub const fn box_wrapping(num: i64) -> Self {
        Value(num.wrapping_shl(1) | INT_TAG)
    }

    /// Unbox an integer
    ///
    /// Fails with `UnexpectedValue` on references.
    pub fn unbox(self) -> Result<i64> {
        if self.is_int() {
            Ok(self.0 >> 1)
        } else {
            Err(GcError::unexpected("int", self.to_string()))
        }
    }

    /// Word holds an integer (Lama's "unboxed" predicate)
    #[inline]
    pub const fn is_int(self) -> bool {
        self.0 & INT_TAG != 0
    }

    /// Word holds a reference (Lama's "boxed" predicate)
    #[inline]
    pub const fn is_ref(self) -> bool {
        !self.is_int()
    }

    /// Encode a heap reference
    pub const fn from_ref(obj: ObjectRef) -> Self {
        let word = ((obj.generation as u64) << GENERATION_SHIFT)
            | (((obj.index as u64) & INDEX_MASK) << 1);
        Value(word as i64)
    }

    /// Decode a heap reference; `None` for integers
    pub const fn as_ref(self) -> Option<ObjectRef> {
        if self.is_int() {
            return None;
        }
        let word = self.0 as u64;
        Some(ObjectRef {
            index: ((word >> 1) & INDEX_MASK) as u32,
            generation: (word >> GENERATION_SHIFT) as u32,
        })
    }

    /// Raw machine word
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Reinterpret a raw machine word
    #[inline]
    pub const fn from_raw(word: i64) -> Self {
        Value(word)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::ZERO
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_ref() {
            None => write!(f, "{}", self.0 >> 1),
            Some(obj) => write!(f, "ref({})", obj),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_ref() {
            None => write!(f, "Int({})", self.0 >> 1),
            Some(obj) => write!(f, "Ref({})", obj),
        }
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::from_ref(obj)
    }
}

impl TryFrom<i64> for Value {
    type Error = GcError;

    fn try_from(num: i64) -> Result<Self> {
        Value::box_int(num)
    }
}

impl From<i32> for Value {
    fn from(num: i32) -> Self {
        Value::box_wrapping(num as i64)
    }
}
