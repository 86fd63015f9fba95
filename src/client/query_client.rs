use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{ClientError, FetchError, HttpTransport, QueryState, Transport, with_retry};
use crate::{
    cache::{MemoryQueryCache, QueryCache, QueryKey},
    config::{AnalyticsConfig, RetryConfig},
    query::{Endpoint, ToQuery},
};

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Value>, FetchError>>>;

/// Fetch adapter with caching, request de-duplication and retries.
///
/// Cloning is cheap; clones share the cache and the in-flight table, so a
/// single client can serve every view in the process.
///
/// - A fresh cache hit is returned without touching the network.
/// - A stale hit is returned immediately and refreshed in the background.
/// - Concurrent requests for the same [`QueryKey`] share one network call.
/// - On failure the last good data for the key stays in the returned state.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn QueryCache>,
    in_flight: DashMap<QueryKey, (u64, SharedFetch)>,
    errors: DashMap<QueryKey, RecordedError>,
    next_id: AtomicU64,
    retry: RetryConfig,
    stale_time: Duration,
    gc_time: Duration,
}

/// Last failure for a key. Forgotten after `gc_time`, like unused cache
/// entries.
struct RecordedError {
    message: String,
    at: Instant,
}

impl QueryClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<dyn QueryCache>,
        retry: RetryConfig,
        stale_time: Duration,
        gc_time: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                cache,
                in_flight: DashMap::new(),
                errors: DashMap::new(),
                next_id: AtomicU64::new(0),
                retry,
                stale_time,
                gc_time,
            }),
        }
    }

    /// HTTP transport and in-memory cache built from configuration.
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::from_config(&config.api)?;
        let cache = MemoryQueryCache::new(&config.cache);
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(cache),
            config.api.retry.clone(),
            config.cache.stale_time(),
            config.cache.gc_time(),
        ))
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &impl ToQuery,
    ) -> QueryState<T> {
        self.fetch_key(&QueryKey::new(endpoint, params)).await
    }

    /// Bypass freshness and wait for a network result (still de-duplicated).
    pub async fn refetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &impl ToQuery,
    ) -> QueryState<T> {
        self.refetch_key(&QueryKey::new(endpoint, params)).await
    }

    pub async fn fetch_key<T: DeserializeOwned>(&self, key: &QueryKey) -> QueryState<T> {
        if let Some(cached) = self.inner.cache.get(key) {
            if !cached.is_stale(self.inner.stale_time) {
                debug!(key = %key, "Query cache hit");
                return self.state_from_cache(key, &cached.data, false);
            }

            debug!(key = %key, "Serving stale result, revalidating in background");
            // The fetch runs on its own task; the handle is not needed here.
            drop(self.start(key));
            return self.state_from_cache(key, &cached.data, true);
        }

        debug!(key = %key, "Query cache miss");
        self.refetch_key(key).await
    }

    pub async fn refetch_key<T: DeserializeOwned>(&self, key: &QueryKey) -> QueryState<T> {
        match self.start(key).await {
            Ok(value) => match decode::<T>(&value) {
                Ok(data) => QueryState::ready(data),
                Err(err) => QueryState::failed(error_message(key, &err)),
            },
            Err(err) => {
                let data = self
                    .inner
                    .cache
                    .get(key)
                    .and_then(|cached| decode::<T>(&cached.data).ok());
                let is_stale = data.is_some();
                QueryState {
                    data,
                    loading: false,
                    error: Some(error_message(key, &err)),
                    is_stale,
                }
            }
        }
    }

    /// Current state for a key without starting a request.
    pub fn snapshot<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &impl ToQuery,
    ) -> QueryState<T> {
        let key = QueryKey::new(endpoint, params);
        match self.inner.cache.get(&key) {
            Some(cached) => {
                let stale = cached.is_stale(self.inner.stale_time);
                self.state_from_cache(&key, &cached.data, stale)
            }
            None => QueryState {
                data: None,
                loading: self.is_fetching(&key),
                error: self.inner.last_error(&key),
                is_stale: false,
            },
        }
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner.in_flight.contains_key(key)
    }

    /// Mark one query stale so the next read refreshes it.
    pub fn invalidate(&self, endpoint: Endpoint, params: &impl ToQuery) -> bool {
        self.inner.cache.invalidate(&QueryKey::new(endpoint, params))
    }

    pub fn invalidate_endpoint(&self, endpoint: Endpoint) -> usize {
        let marked = self.inner.cache.invalidate_endpoint(endpoint);
        debug!(endpoint = %endpoint, marked, "Invalidated cached queries");
        marked
    }

    /// Drop every cached result and remembered error.
    pub fn clear(&self) {
        self.inner.cache.clear();
        self.inner.errors.clear();
    }

    fn state_from_cache<T: DeserializeOwned>(
        &self,
        key: &QueryKey,
        data: &Value,
        stale: bool,
    ) -> QueryState<T> {
        match decode::<T>(data) {
            Ok(data) => QueryState {
                data: Some(data),
                loading: stale && self.is_fetching(key),
                error: self.inner.last_error(key),
                is_stale: stale,
            },
            Err(err) => QueryState::failed(error_message(key, &err)),
        }
    }

    /// Join the in-flight request for `key`, or spawn one.
    fn start(&self, key: &QueryKey) -> SharedFetch {
        match self.inner.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                debug!(key = %key, "Joining in-flight request");
                entry.get().1.clone()
            }
            Entry::Vacant(entry) => {
                let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                let inner = self.inner.clone();
                let task_key = key.clone();
                let handle = tokio::spawn(async move { inner.execute(task_key, id).await });

                let shared = async move {
                    handle.await.unwrap_or_else(|e| {
                        Err(FetchError::Network(format!("fetch task failed: {e}")))
                    })
                }
                .boxed()
                .shared();

                entry.insert((id, shared.clone()));
                shared
            }
        }
    }
}

impl Inner {
    async fn execute(self: Arc<Self>, key: QueryKey, id: u64) -> Result<Arc<Value>, FetchError> {
        let path = key.endpoint().path();
        let result = with_retry(&self.retry, path, || self.transport.get(path, key.params()))
            .await
            .map(Arc::new);

        match &result {
            Ok(value) => {
                // Populate the cache before leaving the in-flight table so a
                // request arriving in between never misses both.
                self.cache.insert(key.clone(), value.clone());
                self.errors.remove(&key);
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Query failed");
                let gc_time = self.gc_time;
                self.errors.retain(|_, e| e.at.elapsed() <= gc_time);
                self.errors.insert(
                    key.clone(),
                    RecordedError {
                        message: error_message(&key, err),
                        at: Instant::now(),
                    },
                );
            }
        }

        self.in_flight
            .remove_if(&key, |_, (entry_id, _)| *entry_id == id);
        result
    }

    fn last_error(&self, key: &QueryKey) -> Option<String> {
        self.errors
            .get(key)
            .filter(|e| e.at.elapsed() <= self.gc_time)
            .map(|e| e.message.clone())
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, FetchError> {
    serde::Deserialize::deserialize(value).map_err(|e| FetchError::MalformedPayload(e.to_string()))
}

fn error_message(key: &QueryKey, err: &FetchError) -> String {
    format!("{}: {}", key.endpoint().error_context(), err)
}
