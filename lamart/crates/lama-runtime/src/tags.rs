//! Sexp tag table
//!
//! Constructor names are interned once; a sexp stores the boxed id of its
//! tag and the table maps it back for rendering. Ids are dense and start at 0.

use rustc_hash::FxHashMap;

/// Interned sexp constructor names
#[derive(Debug, Default)]
pub struct TagTable {
    ids: FxHashMap<String, i64>,
    names: Vec<String>,
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `name`, interning it on first use
    pub fn intern(&mut self, name: &str) -> i64 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len() as i64;
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Id for `name` if it was interned
    pub fn lookup(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| self.names.get(idx))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
