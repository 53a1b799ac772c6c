//! Value rendering (`Lstring`)
//!
//! Output matches what `Lstring` gives a compiled Lama program: integers in
//! decimal, strings quoted, arrays as `[a, b]`, sexps as `Tag (a, b)` with a
//! space before the fields and no parentheses for a nullary constructor
//! (`Nil`, not `Nil()`), closures as `<closure 0xN>`. A reference back into
//! an object that is still being printed renders as `...`.
//!
//! Traversal uses an explicit stack, so long sexp lists render without deep
//! native recursion.

use crate::tags::TagTable;
use lama_gc::{GarbageCollector, ObjectBody, Value};
use rustc_hash::FxHashSet;

enum Step<'a> {
    Visit(Value),
    Text(&'a str),
    Leave(Value),
}

/// Render a value as Lama source-like text
pub fn render(gc: &GarbageCollector, tags: &TagTable, value: Value) -> String {
    let mut out = String::new();
    let mut active: FxHashSet<Value> = FxHashSet::default();
    let mut stack = vec![Step::Visit(value)];

    while let Some(step) = stack.pop() {
        let value = match step {
            Step::Text(text) => {
                out.push_str(text);
                continue;
            }
            Step::Leave(value) => {
                active.remove(&value);
                continue;
            }
            Step::Visit(value) => value,
        };

        if let Ok(n) = value.unbox() {
            out.push_str(&n.to_string());
            continue;
        }

        let object = match gc.get(value) {
            Ok(object) => object,
            Err(_) => {
                out.push_str(&value.to_string());
                continue;
            }
        };

        if !active.insert(value) {
            out.push_str("...");
            continue;
        }
        stack.push(Step::Leave(value));

        match &object.body {
            ObjectBody::String(bytes) => {
                out.push('"');
                out.push_str(&String::from_utf8_lossy(bytes));
                out.push('"');
            }
            ObjectBody::Array(items) => {
                out.push('[');
                push_items(&mut stack, items, "]");
            }
            ObjectBody::Sexp { tag, fields } => {
                match tag.unbox().ok().and_then(|id| tags.name(id)) {
                    Some(name) => out.push_str(name),
                    None => out.push_str(&format!("<tag {}>", tag)),
                }
                if !fields.is_empty() {
                    out.push_str(" (");
                    push_items(&mut stack, fields, ")");
                }
            }
            ObjectBody::Closure { entry, .. } => {
                out.push_str(&format!("<closure {:#x}>", entry.unbox().unwrap_or(0)));
            }
        }
    }

    out
}

/// Schedule `items` separated by commas, followed by `close`
fn push_items<'a>(stack: &mut Vec<Step<'a>>, items: &[Value], close: &'a str) {
    stack.push(Step::Text(close));
    for (i, item) in items.iter().enumerate().rev() {
        stack.push(Step::Visit(*item));
        if i > 0 {
            stack.push(Step::Text(", "));
        }
    }
}
