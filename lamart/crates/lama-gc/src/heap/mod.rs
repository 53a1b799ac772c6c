//! Heap Module - Object Table
//!
//! The heap is a table of slots indexed by `ObjectRef::index`. Each slot keeps
//! a generation counter that is bumped when its object is reclaimed, so a
//! reference that outlives its object is rejected instead of silently naming
//! whatever was allocated in the slot next.
//!
//! ```text
//! slots:     [ gen 1: Array ][ gen 2: <free> ][ gen 1: String ] ...
//! free list: [ 1 ]
//! ```
//!
//! Reclaimed slots are reused LIFO from the free list before the table grows.

use crate::config::MAX_SLOTS;
use crate::error::{GcError, Result};
use crate::object::HeapObject;
use crate::value::{ObjectRef, Value};

/// One entry of the object table
#[derive(Debug)]
struct Slot {
    generation: u32,
    object: Option<HeapObject>,
}

/// Heap usage snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Live objects
    pub objects: usize,
    /// Bytes held by live objects
    pub used: usize,
    /// Slots in the table (live + free)
    pub capacity: usize,
    /// Slots waiting for reuse
    pub free_slots: usize,
}

/// Object table owning every heap object
#[derive(Debug)]
pub struct Heap {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live_objects: usize,
    live_bytes: usize,
}

impl Heap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live_objects: 0,
            live_bytes: 0,
        }
    }

    /// Store an object and return its reference
    pub fn insert(&mut self, object: HeapObject) -> Result<ObjectRef> {
        let size = object.size();

        let obj_ref = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.object.is_none(), "free slot {} still occupied", index);
            slot.object = Some(object);
            ObjectRef::new(index, slot.generation)
        } else {
            if self.slots.len() >= MAX_SLOTS {
                return Err(GcError::OutOfMemory {
                    requested: size,
                    available: 0,
                });
            }
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 1,
                object: Some(object),
            });
            ObjectRef::new(index, 1)
        };

        self.live_objects += 1;
        self.live_bytes += size;
        Ok(obj_ref)
    }

    /// Resolve a reference word to its slot index, validating the generation
    fn resolve(&self, value: Value) -> Result<usize> {
        let obj_ref = value
            .as_ref()
            .ok_or_else(|| GcError::unexpected("reference", value.to_string()))?;
        let index = obj_ref.index as usize;

        let slot = self
            .slots
            .get(index)
            .ok_or(GcError::InvalidReference { word: value.raw() })?;

        if slot.generation != obj_ref.generation {
            return Err(GcError::StaleReference {
                index: obj_ref.index,
                expected: slot.generation,
                found: obj_ref.generation,
            });
        }

        if slot.object.is_none() {
            return Err(GcError::InvalidReference { word: value.raw() });
        }

        Ok(index)
    }

    /// Borrow the object a reference names
    pub fn get(&self, value: Value) -> Result<&HeapObject> {
        let index = self.resolve(value)?;
        self.slots[index]
            .object
            .as_ref()
            .ok_or(GcError::InvalidReference { word: value.raw() })
    }

    /// Mutably borrow the object a reference names
    pub fn get_mut(&mut self, value: Value) -> Result<&mut HeapObject> {
        let index = self.resolve(value)?;
        self.slots[index]
            .object
            .as_mut()
            .ok_or(GcError::InvalidReference { word: value.raw() })
    }

    /// Check that a reference names a live object
    pub fn contains(&self, value: Value) -> bool {
        self.resolve(value).is_ok()
    }

    /// Borrow an object by slot index, ignoring generations (collector use)
    pub(crate) fn slot_object_mut(&mut self, index: usize) -> Option<&mut HeapObject> {
        self.slots.get_mut(index).and_then(|slot| slot.object.as_mut())
    }

    /// Slot index of a live reference, `None` for ints and dead references
    pub(crate) fn live_index(&self, value: Value) -> Option<usize> {
        self.resolve(value).ok()
    }

    /// Adjust live byte accounting after an in-place resize
    pub(crate) fn adjust_live_bytes(&mut self, old_size: usize, new_size: usize) {
        self.live_bytes = self.live_bytes - old_size + new_size;
    }

    /// Free every unmarked object and clear the marks of survivors
    ///
    /// Returns (objects freed, bytes freed).
    pub(crate) fn sweep(&mut self) -> (usize, usize) {
        let mut freed = 0;
        let mut bytes_freed = 0;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(object) = slot.object.as_mut() else {
                continue;
            };

            if object.header.marked {
                object.header.clear_mark();
                continue;
            }

            bytes_freed += object.size();
            freed += 1;
            slot.object = None;
            slot.generation = slot.generation.wrapping_add(1).max(1);
            self.free_list.push(index as u32);
        }

        self.live_objects -= freed;
        self.live_bytes -= bytes_freed;
        (freed, bytes_freed)
    }

    /// Number of live objects
    pub fn live_objects(&self) -> usize {
        self.live_objects
    }

    /// Bytes held by live objects
    pub fn live_bytes(&self) -> usize {
        self.live_bytes
    }

    /// Get heap statistics
    pub fn get_stats(&self) -> HeapStats {
        HeapStats {
            objects: self.live_objects,
            used: self.live_bytes,
            capacity: self.slots.len(),
            free_slots: self.free_list.len(),
        }
    }

    /// Iterate over live objects with their references
    pub fn iter(&self) -> impl Iterator<Item = (ObjectRef, &HeapObject)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.object
                .as_ref()
                .map(|object| (ObjectRef::new(index as u32, slot.generation), object))
        })
    }
}
