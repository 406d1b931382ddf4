use std::collections::{HashMap, VecDeque};

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the text, used as the cache key.
pub fn content_key(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Values derived from a text, keyed by the text's content hash.
///
/// Owned by whoever does the lookups (see `AppData`). A changed text has a
/// different key, so stale entries are never returned, only evicted once the
/// capacity is reached, oldest first.
#[derive(Debug)]
pub struct ContentCache<V> {
    capacity: usize,
    entries: HashMap<String, V>,
    order: VecDeque<String>,
}

impl<V: Clone> ContentCache<V> {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        ContentCache {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, text: &str) -> Option<V> {
        self.entries.get(&content_key(text)).cloned()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(&content_key(text))
    }

    pub fn get_or_insert_with<F>(&mut self, text: &str, f: F) -> V
    where
        F: FnOnce() -> V,
    {
        let key = content_key(text);
        if let Some(v) = self.entries.get(&key) {
            return v.clone();
        }

        let value = f();
        while self.order.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, value.clone());
        value
    }

    /// Drop the entry for this text. Returns true if there was one.
    pub fn invalidate(&mut self, text: &str) -> bool {
        let key = content_key(text);
        self.order.retain(|k| k != &key);
        self.entries.remove(&key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
