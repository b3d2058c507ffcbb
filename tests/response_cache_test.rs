//! Tests for [`ResponseCache`]: bounded FIFO cache of finished summaries.

use termsum::cache::{CacheConfig, CacheKey, ResponseCache};

fn key(n: usize) -> CacheKey {
    CacheKey::derive(&format!("document number {n}"), "curto", "", 5_000)
}

// =========================================================================
// CacheConfig
// =========================================================================

#[test]
fn cache_config_defaults() {
    let config = CacheConfig::default();
    assert_eq!(config.capacity, 50);
    assert_eq!(config.key_prefix_chars, 5_000);
}

#[test]
fn cache_config_builder() {
    let config = CacheConfig::new().capacity(3).key_prefix_chars(10);
    assert_eq!(config.capacity, 3);
    assert_eq!(config.key_prefix_chars, 10);
}

// =========================================================================
// Eviction order
// =========================================================================

#[test]
fn miss_then_hit() {
    let cache = ResponseCache::default();
    assert!(cache.get(&key(1)).is_none());

    cache.put(key(1), "summary one".into());
    assert_eq!(cache.get(&key(1)).as_deref(), Some("summary one"));
}

#[test]
fn capacity_plus_one_evicts_oldest() {
    let cache = ResponseCache::new(&CacheConfig::new().capacity(3));
    for n in 0..4 {
        cache.put(key(n), format!("summary {n}"));
    }

    assert_eq!(cache.len(), 3);
    assert!(!cache.contains(&key(0)), "first inserted entry must be gone");
    for n in 1..4 {
        assert!(cache.contains(&key(n)));
    }
}

#[test]
fn default_capacity_is_never_exceeded() {
    let cache = ResponseCache::default();
    for n in 0..51 {
        cache.put(key(n), format!("summary {n}"));
        assert!(cache.len() <= 50);
    }
    assert_eq!(cache.len(), 50);
    assert!(!cache.contains(&key(0)));
    assert!(cache.contains(&key(50)));
}

#[test]
fn reads_do_not_refresh_position() {
    let cache = ResponseCache::new(&CacheConfig::new().capacity(3));
    cache.put(key(0), "a".into());
    cache.put(key(1), "b".into());
    cache.put(key(2), "c".into());

    // A hit on the oldest entry does not save it.
    assert!(cache.get(&key(0)).is_some());
    cache.put(key(3), "d".into());

    assert!(!cache.contains(&key(0)));
    assert!(cache.contains(&key(1)));
}

#[test]
fn overwrite_keeps_insertion_position() {
    let cache = ResponseCache::new(&CacheConfig::new().capacity(3));
    cache.put(key(0), "a".into());
    cache.put(key(1), "b".into());
    cache.put(key(2), "c".into());

    cache.put(key(0), "a2".into());
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.get(&key(0)).as_deref(), Some("a2"));

    cache.put(key(3), "d".into());
    assert!(!cache.contains(&key(0)));
    assert_eq!(cache.len(), 3);
}

#[test]
fn zero_capacity_stores_nothing() {
    let cache = ResponseCache::new(&CacheConfig::new().capacity(0));
    cache.put(key(0), "a".into());
    assert!(cache.is_empty());
    assert!(cache.get(&key(0)).is_none());
}

#[test]
fn clear_empties_cache() {
    let cache = ResponseCache::default();
    cache.put(key(0), "a".into());
    cache.put(key(1), "b".into());
    cache.clear();
    assert!(cache.is_empty());
}

// =========================================================================
// Keys
// =========================================================================

#[test]
fn texts_sharing_prefix_share_key() {
    let cache = ResponseCache::new(&CacheConfig::new().key_prefix_chars(10));
    let a = cache.key_for("0123456789 tail one", "curto", "");
    let b = cache.key_for("0123456789 tail two", "curto", "");
    assert_eq!(a, b);
}

#[test]
fn difference_inside_prefix_changes_key() {
    let cache = ResponseCache::default();
    let a = cache.key_for("Os dados são vendidos.", "curto", "");
    let b = cache.key_for("Os dados não são vendidos.", "curto", "");
    assert_ne!(a, b);
}

#[test]
fn style_and_instruction_are_part_of_key() {
    let cache = ResponseCache::default();
    let text = "Termos e condições de utilização.";
    let base = cache.key_for(text, "curto", "");
    assert_ne!(base, cache.key_for(text, "riscos", ""));
    assert_ne!(base, cache.key_for(text, "curto", "foca nos prazos"));
}

#[test]
fn key_parts_do_not_run_together() {
    let cache = ResponseCache::default();
    assert_ne!(
        cache.key_for("ab", "c", ""),
        cache.key_for("a", "bc", "")
    );
    assert_ne!(
        cache.key_for("text", "curto", "x"),
        cache.key_for("text", "curtox", "")
    );
}

#[test]
fn key_is_hex_digest() {
    let k = key(7);
    assert_eq!(k.as_str().len(), 64);
    assert!(k.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(k.to_string(), k.as_str());
}
