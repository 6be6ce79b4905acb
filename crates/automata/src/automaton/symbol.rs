//! Symbol identifiers and name interning for automata.

use indexmap::IndexSet;

/// A symbol identifier: the position of the symbol in its automaton's alphabet.
pub type SymbolId = u32;

/// Interns names (of states or symbols) to dense ids, keeping declaration order.
///
/// Ids are handed out in insertion order, so `id as usize` indexes straight back into the
/// table and iteration order is the order the names were declared in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    names: IndexSet<String>,
}

impl NameTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name, returning its id, or `None` if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> Option<u32> {
        let (idx, inserted) = self.names.insert_full(name.into());
        inserted.then_some(idx as u32)
    }

    /// Look up the id of a name.
    pub fn id(&self, name: &str) -> Option<u32> {
        self.names.get_index_of(name).map(|idx| idx as u32)
    }

    /// Look up the name behind an id.
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get_index(id as usize).map(String::as_str)
    }

    /// Get the number of interned names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if no name has been interned.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in id order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for NameTable {
    /// Collects names, silently keeping the first occurrence of duplicates.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
