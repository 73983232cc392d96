//! In-process response cache with pattern invalidation.
//!
//! Keys follow the `domain:detail` convention ("games:list:week=9",
//! "standings:2025"). Invalidation takes a list of patterns where a
//! trailing `*` matches by prefix, so the scheduler can clear exactly
//! the domains a sync touched and nothing else.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// Default entry lifetime.
const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fetch a cached value, dropping it if expired.
    pub fn get(&self, key: &str) -> Option<String> {
        let hit = self.entries.get(key)?;
        if hit.expires_at <= Instant::now() {
            drop(hit);
            self.entries.remove(key);
            return None;
        }
        Some(hit.value.clone())
    }

    pub fn put(&self, key: &str, value: String) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Remove every entry matching any of `patterns`.
    ///
    /// A pattern ending in `*` matches keys by prefix; anything else
    /// must match exactly. Returns the number of entries removed.
    pub fn invalidate(&self, patterns: &[&str]) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, _| !patterns.iter().any(|p| pattern_matches(p, key)));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, ?patterns, "cache entries invalidated");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn pattern_matches(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_roundtrip() {
        let cache = ResponseCache::default();
        cache.put("games:list", "[1,2,3]".into());
        assert_eq!(cache.get("games:list").as_deref(), Some("[1,2,3]"));
        assert_eq!(cache.get("games:other"), None);
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.put("games:list", "x".into());
        assert_eq!(cache.get("games:list"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn prefix_pattern_clears_only_its_domain() {
        let cache = ResponseCache::default();
        cache.put("games:list:week=9", "a".into());
        cache.put("games:401", "b".into());
        cache.put("players:list", "c".into());

        let removed = cache.invalidate(&["games:*"]);
        assert_eq!(removed, 2);
        assert_eq!(cache.get("players:list").as_deref(), Some("c"));
    }

    #[test]
    fn exact_pattern_requires_full_match() {
        let cache = ResponseCache::default();
        cache.put("standings:2025", "a".into());
        cache.put("standings:2024", "b".into());

        assert_eq!(cache.invalidate(&["standings:2025"]), 1);
        assert_eq!(cache.get("standings:2024").as_deref(), Some("b"));
    }

    #[test]
    fn multiple_patterns_union() {
        let cache = ResponseCache::default();
        cache.put("games:1", "a".into());
        cache.put("stats:1", "b".into());
        cache.put("teams:1", "c".into());
        cache.put("players:1", "d".into());

        let removed = cache.invalidate(&["games:*", "stats:*", "teams:*"]);
        assert_eq!(removed, 3);
        assert_eq!(cache.len(), 1);
    }
}
