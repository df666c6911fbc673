use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::compiled_query::CompiledQuery;
use crate::core::runtime_context::{RealTimeProvider, TimeProvider};

pub const DEFAULT_MAX_ENTRIES: usize = 1000;
pub const DEFAULT_TTL_MS: u64 = 3_600_000;

/// Storage for compiled artifacts keyed by source text.
pub trait JitCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CompiledQuery>;
    fn set(&self, key: &str, value: CompiledQuery);
}

/// Bounds for [`LruTtlCache`]. Zero disables the corresponding bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl_ms: DEFAULT_TTL_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

struct CacheEntry<V> {
    value: V,
    created_at: i64,
}

struct LruState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    lru_order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

impl<V> LruState<V> {
    fn touch(&mut self, key: &str) {
        self.lru_order.retain(|k| k != key);
        self.lru_order.push_back(key.to_string());
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        self.lru_order.retain(|k| k != key);
        self.entries.remove(key).map(|entry| entry.value)
    }

    fn pop_lru(&mut self) -> Option<String> {
        let key = self.lru_order.pop_front()?;
        self.entries.remove(&key);
        Some(key)
    }
}

/// Least-recently-used cache with a time-to-live.
///
/// Both bounds apply independently: inserting beyond `max_entries` evicts
/// the least recently read or written entry, and an entry older than
/// `ttl_ms` is treated as absent and dropped on lookup. Reads refresh the
/// LRU position but not the age.
pub struct LruTtlCache<V = CompiledQuery> {
    state: Mutex<LruState<V>>,
    config: CacheConfig,
    time: Arc<dyn TimeProvider>,
}

impl<V: Clone> LruTtlCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_time_provider(config, Arc::new(RealTimeProvider))
    }

    pub fn with_time_provider(config: CacheConfig, time: Arc<dyn TimeProvider>) -> Self {
        Self {
            state: Mutex::new(LruState {
                entries: HashMap::new(),
                lru_order: VecDeque::new(),
                hits: 0,
                misses: 0,
            }),
            config,
            time,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.time.now_millis();
        let mut state = self.state.lock();

        let lookup = state
            .entries
            .get(key)
            .map(|entry| (self.is_expired(entry, now), entry.value.clone()));
        match lookup {
            Some((false, value)) => {
                state.hits += 1;
                state.touch(key);
                Some(value)
            }
            Some((true, _)) => {
                state.remove(key);
                state.misses += 1;
                None
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    pub fn insert(&self, key: &str, value: V) {
        let entry = CacheEntry {
            value,
            created_at: self.time.now_millis(),
        };
        let mut state = self.state.lock();
        state.entries.insert(key.to_string(), entry);
        state.touch(key);

        if self.config.max_entries == 0 {
            return;
        }
        while state.entries.len() > self.config.max_entries {
            if state.pop_lru().is_none() {
                break;
            }
        }
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.state.lock().remove(key)
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.lru_order.clear();
    }

    /// Number of stored entries, expired ones included until looked up.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.len(),
            hits: state.hits,
            misses: state.misses,
        }
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: i64) -> bool {
        if self.config.ttl_ms == 0 {
            return false;
        }
        u64::try_from(now.saturating_sub(entry.created_at))
            .map_or(false, |age| age > self.config.ttl_ms)
    }
}

impl Default for LruTtlCache<CompiledQuery> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl JitCache for LruTtlCache<CompiledQuery> {
    fn get(&self, key: &str) -> Option<CompiledQuery> {
        LruTtlCache::get(self, key)
    }

    fn set(&self, key: &str, value: CompiledQuery) {
        self.insert(key, value);
    }
}
