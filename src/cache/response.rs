//! Process-lifetime response cache for generated summaries.
//!
//! [`ResponseCache`] memoizes summaries keyed on a digest of
//! (document prefix, style, custom instruction). It is owned by the
//! [`Summarizer`](crate::Summarizer) that uses it and injected at
//! construction, so tests get a fresh cache each.
//!
//! # Eviction
//!
//! Eviction is strict FIFO by insertion order: reads never refresh an
//! entry. When the cache holds `capacity` entries and a new key arrives, the
//! oldest-inserted key is evicted *before* the insert, so the size never
//! exceeds `capacity`. Overwriting an existing key keeps its original
//! position.
//!
//! # Concurrency
//!
//! All state sits behind one mutex. Two concurrent misses on the same key
//! both call upstream and both insert; the second insert overwrites the
//! first. That duplicate call is accepted.
//!
//! # Key collisions
//!
//! Only the first `key_prefix_chars` characters of the document feed the
//! digest, so two documents sharing a long prefix share a cache entry.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use sha2::{Digest, Sha256};

use crate::prompt::truncate_chars;
use crate::telemetry;

/// Configuration for the response cache.
///
/// ```rust
/// # use termsum::CacheConfig;
/// let config = CacheConfig::new()
///     .capacity(100)
///     .key_prefix_chars(2_000);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached summaries. Default: 50.
    pub capacity: usize,
    /// Number of leading document characters that feed the key. Default: 5,000.
    pub key_prefix_chars: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            key_prefix_chars: 5_000,
        }
    }
}

impl CacheConfig {
    /// Create a new config with the default bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached summaries.
    pub fn capacity(mut self, n: usize) -> Self {
        self.capacity = n;
        self
    }

    /// Set how many leading characters of the document feed the key.
    pub fn key_prefix_chars(mut self, n: usize) -> Self {
        self.key_prefix_chars = n;
        self
    }
}

/// Fixed-length digest identifying one summary request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive a key from the first `prefix_chars` characters of `text`,
    /// the style identifier, and the custom instruction.
    ///
    /// Each component is length-prefixed before hashing so that shifting
    /// characters between components changes the digest.
    pub fn derive(text: &str, style_id: &str, custom_instruction: &str, prefix_chars: usize) -> Self {
        let mut hasher = Sha256::new();
        for part in [truncate_chars(text, prefix_chars), style_id, custom_instruction] {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex form of the digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, String>,
    order: VecDeque<CacheKey>,
}

/// Bounded, insertion-ordered summary cache. See the module docs.
pub struct ResponseCache {
    state: Mutex<CacheState>,
    config: CacheConfig,
}

impl ResponseCache {
    /// Create an empty cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            config: config.clone(),
        }
    }

    /// Key for a request under this cache's prefix length.
    pub fn key_for(&self, text: &str, style_id: &str, custom_instruction: &str) -> CacheKey {
        CacheKey::derive(
            text,
            style_id,
            custom_instruction,
            self.config.key_prefix_chars,
        )
    }

    /// Look up a cached summary. Emits hit/miss metrics.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.entries.get(key) {
            Some(summary) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(summary.clone())
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Store a summary, evicting the oldest entry first when full.
    pub fn put(&self, key: CacheKey, summary: String) {
        if self.config.capacity == 0 {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = state.entries.get_mut(&key) {
            *existing = summary;
            return;
        }
        while state.order.len() >= self.config.capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
            metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL).increment(1);
        }
        state.order.push_back(key.clone());
        state.entries.insert(key, summary);
    }

    /// Whether `key` is present, without touching hit/miss metrics.
    pub fn contains(&self, key: &CacheKey) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.contains_key(key)
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Evict all entries.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
        state.order.clear();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
