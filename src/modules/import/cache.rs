/// Cache invalidation after forced-refresh imports
///
/// The cache is not required for correctness, only freshness: after a forced
/// re-import the finalizer evicts the artist's keys by pattern so readers see
/// the new data immediately.
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use dashmap::DashMap;
use regex::Regex;

#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Evict all keys matching the glob-style pattern (`*` wildcard).
    /// Returns the number of evicted keys.
    async fn invalidate_pattern(&self, pattern: &str) -> AppResult<usize>;
}

/// In-process cache with pattern eviction
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheInvalidator for MemoryCache {
    async fn invalidate_pattern(&self, pattern: &str) -> AppResult<usize> {
        let regex = glob_to_regex(pattern)?;
        let before = self.entries.len();
        self.entries.retain(|key, _| !regex.is_match(key));
        Ok(before - self.entries.len())
    }
}

fn glob_to_regex(pattern: &str) -> AppResult<Regex> {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!("^{}$", escaped))
        .map_err(|e| AppError::ValidationError(format!("invalid cache pattern: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn evicts_matching_keys_only() {
        let cache = MemoryCache::new();
        cache.put("artist:1:profile", "a");
        cache.put("artist:1:shows", "b");
        cache.put("artist:2:profile", "c");

        let evicted = cache.invalidate_pattern("artist:1:*").await.unwrap();
        assert_eq!(evicted, 2);
        assert!(cache.get("artist:1:profile").is_none());
        assert_eq!(cache.get("artist:2:profile").as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn literal_patterns_do_not_glob() {
        let cache = MemoryCache::new();
        cache.put("artist:1:profile", "a");
        cache.put("artist:11:profile", "b");

        let evicted = cache.invalidate_pattern("artist:1:profile").await.unwrap();
        assert_eq!(evicted, 1);
        assert!(cache.get("artist:11:profile").is_some());
    }
}
