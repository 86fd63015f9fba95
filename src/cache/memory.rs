use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use super::{CachedQuery, QueryCache, QueryKey};
use crate::{config::QueryCacheConfig, query::Endpoint};

struct CacheEntry {
    query: CachedQuery,
    last_accessed: Instant,
}

impl CacheEntry {
    fn new(data: Arc<Value>) -> Self {
        Self {
            query: CachedQuery::new(data),
            last_accessed: Instant::now(),
        }
    }

    /// An entry nobody has read for `gc_time` is garbage.
    fn is_expired(&self, gc_time: Duration) -> bool {
        self.last_accessed.elapsed() > gc_time
    }

    fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// In-memory query cache on a concurrent map.
///
/// Entries expire once unread for `gc_time`. When the cache is full,
/// expired entries go first, then the least recently read ones in batches
/// of `eviction_batch_size`.
pub struct MemoryQueryCache {
    data: Arc<DashMap<QueryKey, CacheEntry>>,
    gc_time: Duration,
    max_entries: usize,
    eviction_batch_size: usize,
}

impl MemoryQueryCache {
    pub fn new(config: &QueryCacheConfig) -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            gc_time: config.gc_time(),
            max_entries: config.max_entries.max(1),
            eviction_batch_size: config.eviction_batch_size.max(1),
        }
    }

    fn evict_if_needed(&self) {
        if self.data.len() < self.max_entries {
            return;
        }

        // First pass: remove all expired entries
        let gc_time = self.gc_time;
        self.data.retain(|_, entry| !entry.is_expired(gc_time));

        let current_len = self.data.len();
        if current_len < self.max_entries {
            return;
        }

        let target_size = self.max_entries.saturating_sub(self.eviction_batch_size);
        let to_evict = current_len.saturating_sub(target_size);
        if to_evict == 0 {
            return;
        }

        let mut entries: Vec<_> = self
            .data
            .iter()
            .map(|entry| (entry.key().clone(), entry.last_accessed))
            .collect();
        entries.sort_by_key(|(_, last_accessed)| *last_accessed);

        for (key, _) in entries.into_iter().take(to_evict) {
            self.data.remove(&key);
        }
        debug!(evicted = to_evict, "Query cache full, evicted least recently used");
    }
}

impl QueryCache for MemoryQueryCache {
    fn get(&self, key: &QueryKey) -> Option<CachedQuery> {
        let mut entry = self.data.get_mut(key)?;
        if entry.is_expired(self.gc_time) {
            drop(entry);
            self.data.remove(key);
            return None;
        }
        entry.touch();
        Some(entry.query.clone())
    }

    fn insert(&self, key: QueryKey, data: Arc<Value>) {
        if !self.data.contains_key(&key) {
            self.evict_if_needed();
        }
        self.data.insert(key, CacheEntry::new(data));
    }

    fn invalidate(&self, key: &QueryKey) -> bool {
        match self.data.get_mut(key) {
            Some(mut entry) => {
                entry.query.invalidated = true;
                true
            }
            None => false,
        }
    }

    fn invalidate_endpoint(&self, endpoint: Endpoint) -> usize {
        let mut marked = 0;
        for mut entry in self.data.iter_mut() {
            if entry.key().endpoint() == endpoint {
                entry.query.invalidated = true;
                marked += 1;
            }
        }
        marked
    }

    fn remove(&self, key: &QueryKey) -> bool {
        self.data.remove(key).is_some()
    }

    fn clear(&self) {
        self.data.clear();
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::time::advance;

    use super::*;
    use crate::query::{DateRange, FilterParams};

    fn test_config(max_entries: usize, eviction_batch_size: usize) -> QueryCacheConfig {
        QueryCacheConfig {
            max_entries,
            eviction_batch_size,
            ..Default::default()
        }
    }

    fn key(endpoint: Endpoint, company: &str) -> QueryKey {
        let range = DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        );
        QueryKey::new(
            endpoint,
            &FilterParams {
                range,
                companies: [company.to_string()].into(),
            },
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = MemoryQueryCache::new(&test_config(100, 10));
        cache.insert(key(Endpoint::Metrics, "a"), Arc::new(json!({"total": 1})));

        let hit = cache.get(&key(Endpoint::Metrics, "a")).unwrap();
        assert_eq!(*hit.data, json!({"total": 1}));
        assert!(!hit.invalidated);
        assert!(cache.get(&key(Endpoint::Metrics, "b")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_staleness_follows_fetch_time() {
        let cache = MemoryQueryCache::new(&test_config(100, 10));
        cache.insert(key(Endpoint::Metrics, "a"), Arc::new(json!(1)));

        let stale_time = Duration::from_secs(300);
        assert!(!cache.get(&key(Endpoint::Metrics, "a")).unwrap().is_stale(stale_time));

        advance(Duration::from_secs(301)).await;
        assert!(cache.get(&key(Endpoint::Metrics, "a")).unwrap().is_stale(stale_time));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unread_entries_expire_after_gc_time() {
        let cache = MemoryQueryCache::new(&test_config(100, 10));
        cache.insert(key(Endpoint::Metrics, "a"), Arc::new(json!(1)));

        advance(Duration::from_secs(601)).await;
        assert!(cache.get(&key(Endpoint::Metrics, "a")).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_keeps_data_but_marks_stale() {
        let cache = MemoryQueryCache::new(&test_config(100, 10));
        cache.insert(key(Endpoint::Metrics, "a"), Arc::new(json!(1)));

        assert!(cache.invalidate(&key(Endpoint::Metrics, "a")));
        assert!(!cache.invalidate(&key(Endpoint::Metrics, "zzz")));

        let hit = cache.get(&key(Endpoint::Metrics, "a")).unwrap();
        assert!(hit.is_stale(Duration::from_secs(3600)));
        assert_eq!(*hit.data, json!(1));
    }

    #[tokio::test]
    async fn test_invalidate_endpoint() {
        let cache = MemoryQueryCache::new(&test_config(100, 10));
        cache.insert(key(Endpoint::Metrics, "a"), Arc::new(json!(1)));
        cache.insert(key(Endpoint::Metrics, "b"), Arc::new(json!(2)));
        cache.insert(key(Endpoint::EventMetrics, "a"), Arc::new(json!(3)));

        assert_eq!(cache.invalidate_endpoint(Endpoint::Metrics), 2);
        assert!(!cache.get(&key(Endpoint::EventMetrics, "a")).unwrap().invalidated);
    }

    #[tokio::test]
    async fn test_reinsert_clears_invalidation() {
        let cache = MemoryQueryCache::new(&test_config(100, 10));
        cache.insert(key(Endpoint::Metrics, "a"), Arc::new(json!(1)));
        cache.invalidate(&key(Endpoint::Metrics, "a"));
        cache.insert(key(Endpoint::Metrics, "a"), Arc::new(json!(2)));

        let hit = cache.get(&key(Endpoint::Metrics, "a")).unwrap();
        assert!(!hit.invalidated);
        assert_eq!(*hit.data, json!(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lru_eviction() {
        let cache = MemoryQueryCache::new(&test_config(3, 1));
        cache.insert(key(Endpoint::Metrics, "a"), Arc::new(json!("a")));
        advance(Duration::from_millis(10)).await;
        cache.insert(key(Endpoint::Metrics, "b"), Arc::new(json!("b")));
        advance(Duration::from_millis(10)).await;
        cache.insert(key(Endpoint::Metrics, "c"), Arc::new(json!("c")));
        advance(Duration::from_millis(10)).await;

        // Reading "a" makes "b" the least recently used
        cache.get(&key(Endpoint::Metrics, "a"));
        advance(Duration::from_millis(10)).await;

        cache.insert(key(Endpoint::Metrics, "d"), Arc::new(json!("d")));

        assert_eq!(cache.len(), 3);
        assert!(cache.get(&key(Endpoint::Metrics, "a")).is_some());
        assert!(cache.get(&key(Endpoint::Metrics, "b")).is_none());
        assert!(cache.get(&key(Endpoint::Metrics, "d")).is_some());
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let cache = MemoryQueryCache::new(&test_config(100, 10));
        cache.insert(key(Endpoint::Metrics, "a"), Arc::new(json!(1)));
        cache.insert(key(Endpoint::Metrics, "b"), Arc::new(json!(2)));

        assert!(cache.remove(&key(Endpoint::Metrics, "a")));
        assert!(!cache.remove(&key(Endpoint::Metrics, "a")));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
