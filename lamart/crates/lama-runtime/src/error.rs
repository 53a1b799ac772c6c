//! Error types for the Lama runtime
//!
//! Heap failures arrive wrapped from `lama_gc`; everything else is a
//! misuse of a builtin (wrong kind, bad index, malformed input).

use lama_gc::GcError;
use thiserror::Error;

/// RuntimeError - failures of runtime builtins
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Heap or value-encoding failure
    #[error(transparent)]
    Gc(#[from] GcError),

    /// Element index outside `0..length`
    #[error("Index {index} out of range for length {length}")]
    IndexOutOfRange { index: i64, length: usize },

    /// Declared element count differs from the elements supplied
    #[error("Arity mismatch: declared {declared} elements, {provided} provided")]
    ArityMismatch { declared: i64, provided: usize },

    /// A builtin received a value of the wrong kind
    #[error("Unexpected value: expected {expected}, found {found}")]
    UnexpectedValue { expected: String, found: String },

    /// Tag id that was never interned
    #[error("Unknown sexp tag {0}")]
    UnknownTag(i64),

    /// Global API used before `initialize`
    #[error("Runtime not initialized")]
    NotInitialized,

    /// Unparseable input to `read_int`
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>) -> Self {
        RuntimeError::UnexpectedValue {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
