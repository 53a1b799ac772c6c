//! Marker Module - Reachability Marking
//!
//! Marks every object reachable from the root set. Tracing uses an explicit
//! worklist so deep structures (long lists built from nested sexps) cannot
//! overflow the native stack.

pub mod roots;

pub use roots::{RootSet, ScopeMark};

use crate::heap::Heap;
use crate::value::Value;

/// Result of a mark phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkStats {
    /// Objects newly marked
    pub marked: usize,
    /// Reference words examined
    pub scanned: usize,
}

/// Marker - traces the object graph from a set of roots
#[derive(Debug, Default)]
pub struct Marker {
    worklist: Vec<usize>,
}

impl Marker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark everything reachable from `roots`
    ///
    /// References that no longer resolve (stale or dangling handles still
    /// pinned by the embedder) are skipped.
    pub fn mark<I>(&mut self, heap: &mut Heap, roots: I) -> MarkStats
    where
        I: IntoIterator<Item = Value>,
    {
        let mut stats = MarkStats::default();
        self.worklist.clear();

        for root in roots {
            self.push(heap, root, &mut stats);
        }

        let mut children = Vec::new();
        while let Some(index) = self.worklist.pop() {
            children.clear();
            if let Some(object) = heap.slot_object_mut(index) {
                children.extend(object.body.children());
            }
            for child in children.iter().copied() {
                self.push(heap, child, &mut stats);
            }
        }

        stats
    }

    fn push(&mut self, heap: &mut Heap, value: Value, stats: &mut MarkStats) {
        if value.is_int() {
            return;
        }
        stats.scanned += 1;

        let Some(index) = heap.live_index(value) else {
            return;
        };
        if let Some(object) = heap.slot_object_mut(index) {
            if !object.header.set_marked() {
                stats.marked += 1;
                self.worklist.push(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{HeapObject, ObjectBody};

    #[test]
    fn test_marks_transitively() {
        let mut heap = Heap::with_capacity(4);
        let leaf = Value::from_ref(
            heap.insert(HeapObject::new(ObjectBody::String(b"leaf".to_vec())))
                .unwrap(),
        );
        let mid = Value::from_ref(
            heap.insert(HeapObject::new(ObjectBody::Array(vec![leaf])))
                .unwrap(),
        );
        let root = Value::from_ref(
            heap.insert(HeapObject::new(ObjectBody::Sexp {
                tag: Value::box_wrapping(1),
                fields: vec![mid, Value::box_wrapping(7)],
            }))
            .unwrap(),
        );
        let garbage = Value::from_ref(
            heap.insert(HeapObject::new(ObjectBody::Array(vec![])))
                .unwrap(),
        );

        let stats = Marker::new().mark(&mut heap, [root]);
        assert_eq!(stats.marked, 3);

        let (freed, _) = heap.sweep();
        assert_eq!(freed, 1);
        assert!(heap.contains(leaf));
        assert!(!heap.contains(garbage));
    }

    #[test]
    fn test_cycles_terminate() {
        let mut heap = Heap::with_capacity(2);
        let a = Value::from_ref(
            heap.insert(HeapObject::new(ObjectBody::Array(vec![Value::ZERO])))
                .unwrap(),
        );
        if let ObjectBody::Array(items) = &mut heap.get_mut(a).unwrap().body {
            items[0] = a;
        }

        let stats = Marker::new().mark(&mut heap, [a, a]);
        assert_eq!(stats.marked, 1);
        assert_eq!(stats.scanned, 3);
    }
}
