//! # lama-runtime - Runtime Support for Compiled Lama Programs
//!
//! Boxed values, heap objects and the builtins compiled Lama code calls,
//! backed by the `lama-gc` collector.
//!
//! ## Quick Start
//!
//! ```rust
//! use lama_runtime::{box_int, unbox, Runtime};
//!
//! fn main() -> Result<(), lama_runtime::RuntimeError> {
//!     let mut rt = Runtime::with_defaults()?;
//!
//!     let elems = [box_int(1)?, box_int(2)?, box_int(3)?];
//!     let array = rt.make_array(box_int(3)?, &elems)?;
//!     assert_eq!(unbox(rt.element_at(array, box_int(1)?)?)?, 2);
//!
//!     let list = rt.make_sexp("Cons", &[box_int(1)?, array])?;
//!     assert_eq!(rt.render(list), "Cons (1, [1, 2, 3])");
//!     Ok(())
//! }
//! ```
//!
//! ## Global Instance
//!
//! Compiled programs use one process-wide runtime through [`global`] and the
//! C ABI in [`ffi`]:
//!
//! ```c
//! __gc_init();
//! void* p = Barray(BOX(3), (long[]){BOX(1), BOX(2), BOX(3)});
//! long second = UNBOX(Belem(p, BOX(1)));   /* 2 */
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Runtime error type
//! - [`ffi`]: `extern "C"` entry points
//! - [`global`]: Process-wide runtime instance
//! - [`io`]: Console builtins
//! - [`render`]: Value rendering
//! - [`runtime`]: Builtins over one heap
//! - [`tags`]: Sexp tag interning

pub mod error;
pub mod ffi;
pub mod global;
pub mod io;
pub mod render;
pub mod runtime;
pub mod tags;

pub use error::{Result, RuntimeError};
pub use global::{initialize, initialize_with_config, is_initialized, shutdown};
pub use lama_gc::{GcConfig, ScopeMark, Value};
pub use runtime::{box_int, unbox, Runtime};

/// lama-runtime version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
