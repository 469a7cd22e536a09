//! In-memory search index over the candidate pool.
//!
//! Each entry pairs an item with an ordered list of lower-cased search keys
//! (raw field values plus their pinyin forms, built by the controller).
//! Queries are single substring tokens; matches preserve entry insertion
//! order, so results are always an order-preserving subsequence of the pool.

use serde_json::Value;

#[derive(Debug, Clone)]
struct IndexEntry {
    item: Value,
    keys: Vec<String>,
}

/// Substring search index, rebuilt wholesale whenever the pool changes.
#[derive(Debug, Default)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all entries. Results from queries answered before the reset
    /// no longer correspond to the index and must be recomputed.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Associate an item with its search keys. Keys are stored lower-cased;
    /// empty keys are dropped.
    pub fn add_entry(&mut self, item: Value, keys: Vec<String>) {
        let keys = keys
            .into_iter()
            .filter(|k| !k.is_empty())
            .map(|k| k.to_lowercase())
            .collect();
        self.entries.push(IndexEntry { item, keys });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All items whose key list contains the query as a substring, in entry
    /// insertion order. An entry with several matching keys appears once.
    /// The empty query matches nothing.
    pub fn search(&self, query: &str) -> Vec<Value> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.keys.iter().any(|key| key.contains(&needle)))
            .map(|entry| entry.item.clone())
            .collect()
    }
}
