use std::{sync::Arc, time::Duration};

use serde_json::Value;
use tokio::time::Instant;

use super::QueryKey;
use crate::query::Endpoint;

/// A cached query result.
///
/// The payload is shared; consumers deserialize their own copy and never
/// mutate it in place.
#[derive(Debug, Clone)]
pub struct CachedQuery {
    pub data: Arc<Value>,
    pub fetched_at: Instant,
    /// Set by manual invalidation; forces the next read to refresh.
    pub invalidated: bool,
}

impl CachedQuery {
    pub fn new(data: Arc<Value>) -> Self {
        Self {
            data,
            fetched_at: Instant::now(),
            invalidated: false,
        }
    }

    pub fn is_stale(&self, stale_time: Duration) -> bool {
        self.invalidated || self.fetched_at.elapsed() >= stale_time
    }
}

/// Storage for completed query results, keyed by [`QueryKey`].
///
/// Implementations must be safe to share across tasks. Expiry of unused
/// entries is the implementation's concern; staleness is decided by the
/// caller from [`CachedQuery::fetched_at`].
pub trait QueryCache: Send + Sync {
    fn get(&self, key: &QueryKey) -> Option<CachedQuery>;

    fn insert(&self, key: QueryKey, data: Arc<Value>);

    /// Mark one entry stale while keeping its data readable.
    /// Returns whether the key was present.
    fn invalidate(&self, key: &QueryKey) -> bool;

    /// Mark every entry for `endpoint` stale. Returns how many were marked.
    fn invalidate_endpoint(&self, endpoint: Endpoint) -> usize;

    fn remove(&self, key: &QueryKey) -> bool;

    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
