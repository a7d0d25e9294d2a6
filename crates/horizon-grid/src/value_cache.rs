//! Per-grid cache of computed cell values.
//!
//! Values are keyed by row id and column id. Column ids can be reused by an
//! unrelated column after definitions are reloaded, so the column model
//! expires the whole cache on every reload.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

/// Cache of computed values keyed by `(row id, column id)`.
#[derive(Debug, Default)]
pub struct ValueCache {
    entries: Mutex<HashMap<(String, String), Value>>,
    generation: AtomicU64,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row_id: &str, col_id: &str) -> Option<Value> {
        self.entries
            .lock()
            .get(&(row_id.to_string(), col_id.to_string()))
            .cloned()
    }

    pub fn set(&self, row_id: impl Into<String>, col_id: impl Into<String>, value: Value) {
        self.entries
            .lock()
            .insert((row_id.into(), col_id.into()), value);
    }

    /// Drop every cached value and start a new generation.
    pub fn expire(&self) {
        self.entries.lock().clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Incremented by every [`expire`](Self::expire).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expire_clears_and_bumps_generation() {
        let cache = ValueCache::new();
        cache.set("row-1", "price", json!(12.5));
        assert_eq!(cache.get("row-1", "price"), Some(json!(12.5)));
        assert_eq!(cache.get("row-1", "qty"), None);

        cache.expire();
        assert!(cache.is_empty());
        assert_eq!(cache.generation(), 1);
    }
}
