//! Recent search queries kept in an injected key-value store.

use std::collections::HashMap;

/// Storage used for search history (browser local storage, a file, memory).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn clear(&mut self, key: &str);
}

/// In-memory store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn clear(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Key the history is stored under.
pub const HISTORY_KEY: &str = "search_history";
/// Most recent queries kept.
pub const MAX_HISTORY: usize = 10;

/// Most-recent-first query list, stored as a JSON array.
#[derive(Clone, Debug)]
pub struct SearchHistory<S> {
    store: S,
    key: String,
    limit: usize,
}

impl<S: KeyValueStore> SearchHistory<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: HISTORY_KEY.to_string(),
            limit: MAX_HISTORY,
        }
    }

    /// Stored queries, newest first. Unreadable data reads as empty.
    pub fn entries(&self) -> Vec<String> {
        let Some(raw) = self.store.get(&self.key) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Ignoring unreadable search history: {}", e);
                Vec::new()
            }
        }
    }

    /// Move (or insert) a query to the front and drop anything past the limit.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let mut entries = self.entries();
        entries.retain(|e| e != query);
        entries.insert(0, query.to_string());
        entries.truncate(self.limit);
        match serde_json::to_string(&entries) {
            Ok(raw) => self.store.set(&self.key, raw),
            Err(e) => log::warn!("Could not save search history: {}", e),
        }
    }

    pub fn clear(&mut self) {
        self.store.clear(&self.key);
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
