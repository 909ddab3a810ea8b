//! Thread-safe cache of transform engines.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::MathError;

use super::engine::FftEngine;

/// Cache key for engines.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct EngineKey {
    pub log2_size: u32,
    pub precision: i64,
}

/// Keeps engines, and so their root tables, alive across multiplications.
pub struct EngineCache {
    engines: Mutex<HashMap<EngineKey, Arc<FftEngine>>>,
    max_entries: usize,
}

impl EngineCache {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            engines: Mutex::new(HashMap::new()),
            max_entries,
        }
    }

    /// The engine for `key`, created on first use.
    pub fn get(&self, key: EngineKey) -> Result<Arc<FftEngine>, MathError> {
        let mut engines = self.engines.lock();
        if let Some(engine) = engines.get(&key) {
            return Ok(Arc::clone(engine));
        }
        if engines.len() >= self.max_entries {
            engines.clear();
        }
        let engine = Arc::new(FftEngine::new(key.log2_size, key.precision)?);
        engines.insert(key, Arc::clone(&engine));
        Ok(engine)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.engines.lock().clear();
    }
}

impl Default for EngineCache {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_engine() {
        let cache = EngineCache::new(4);
        let key = EngineKey {
            log2_size: 3,
            precision: 40,
        };
        let a = cache.get(key).unwrap();
        let b = cache.get(key).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn eviction_when_full() {
        let cache = EngineCache::new(2);
        for log2_size in 1..=3 {
            cache
                .get(EngineKey {
                    log2_size,
                    precision: 16,
                })
                .unwrap();
        }
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn invalid_key_is_not_cached() {
        let cache = EngineCache::default();
        let key = EngineKey {
            log2_size: 2,
            precision: -3,
        };
        assert!(cache.get(key).is_err());
        assert!(cache.is_empty());
    }
}
