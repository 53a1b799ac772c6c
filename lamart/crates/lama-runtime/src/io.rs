//! Console builtins (`Lwrite`, `Lread`)
//!
//! Both are generic over the stream so the C ABI can hand in stdio and tests
//! can use in-memory buffers.

use crate::error::{Result, RuntimeError};
use lama_gc::Value;
use std::io::{BufRead, Write};

/// Write an integer followed by a newline; returns boxed 0
pub fn write_int<W: Write>(out: &mut W, value: Value) -> Result<Value> {
    let n = value.unbox()?;
    writeln!(out, "{}", n)?;
    Ok(Value::ZERO)
}

/// Prompt with `> ` and read one integer line
pub fn read_int<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Value> {
    write!(out, "> ")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(RuntimeError::InvalidInput(
            "unexpected end of input".to_string(),
        ));
    }

    let n: i64 = line
        .trim()
        .parse()
        .map_err(|_| RuntimeError::InvalidInput(format!("not an integer: {:?}", line.trim())))?;
    Ok(Value::box_int(n)?)
}
