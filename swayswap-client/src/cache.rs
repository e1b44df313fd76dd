use std::{error::Error, fmt::Debug, hash::Hash, sync::Arc, time::Duration};

use futures03::Future;
use metrics::counter;
use mini_moka::sync::Cache;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{instrument, trace, Level};

/// A cached value slot.
///
/// The slot is inserted empty while the first fetch is in flight. Concurrent readers
/// of the same key block on the mutex until the value is written, so a burst of
/// misses results in a single fetch.
struct Slot<V> {
    value: Mutex<Option<Arc<V>>>,
}

impl<V> Slot<V> {
    fn placeholder() -> Self {
        Self { value: Mutex::new(None) }
    }

    fn update(&self, new_value: Arc<V>, mut guard: MutexGuard<'_, Option<Arc<V>>>) {
        *guard = Some(new_value);
    }
}

/// Keyed query cache with a time to live.
///
/// A failed fetch leaves nothing behind, the next read for that key fetches again.
pub struct QueryCache<K, V> {
    name: String,
    cache: Cache<K, Arc<Slot<V>>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Clone + Hash + Eq + Send + Sync + Debug + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(name: &str, capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { name: name.to_string(), cache }
    }

    /// Returns the cached value for `key`, fetching it with `fallback` on a miss.
    #[instrument(
        name = "query.cache.get",
        level = Level::TRACE,
        fields(miss, query = self.name),
        skip(self, fallback))
    ]
    pub async fn get<'a, E, Fut, F>(&'a self, key: K, fallback: F) -> Result<Arc<V>, E>
    where
        E: Error,
        Fut: Future<Output = Result<V, E>> + Send + 'a,
        F: FnOnce(K) -> Fut + Send,
    {
        if let Some(slot) = self.cache.get(&key) {
            // An empty slot means the fetch that created it failed, treat it as a miss.
            if let Some(res) = slot.value.lock().await.clone() {
                tracing::Span::current().record("miss", false);
                trace!("CacheHit");
                counter!("query_cache_hits", "cache" => self.name.clone()).increment(1);
                return Ok(res);
            }
        }

        tracing::Span::current().record("miss", true);
        trace!("CacheMiss");
        counter!("query_cache_misses", "cache" => self.name.clone()).increment(1);

        let slot = Arc::new(Slot::placeholder());
        let guard = slot.value.lock().await;
        self.cache
            .insert(key.clone(), slot.clone());
        trace!("SavedPlaceholder");

        let response = fallback(key.clone())
            .await
            .inspect_err(|_| {
                self.cache.invalidate(&key);
                trace!("FallbackFailure");
            })?;
        let response = Arc::new(response);
        slot.update(response.clone(), guard);
        trace!("UpdatedPlaceholder");
        Ok(response)
    }

    /// Drops the cached value so the next `get` fetches again.
    pub fn invalidate(&self, key: &K) {
        trace!(?key, query = self.name, "CacheInvalidate");
        self.cache.invalidate(key);
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU32, Ordering};

    use futures03::future::try_join_all;
    use thiserror::Error;

    use super::*;

    #[derive(Error, Debug)]
    #[error("fetch failed")]
    struct FetchError;

    async fn count_fetch(counter: Arc<AtomicU32>) -> Result<u32, FetchError> {
        tokio::task::yield_now().await;
        Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[test_log::test(tokio::test)]
    async fn test_sequential_access() {
        let counter = Arc::new(AtomicU32::new(0));
        let cache = QueryCache::<String, u32>::new("test", 10, Duration::from_secs(3600));

        let first = cache
            .get("k0".to_string(), |_| count_fetch(counter.clone()))
            .await
            .unwrap();
        let second = cache
            .get("k0".to_string(), |_| count_fetch(counter.clone()))
            .await
            .unwrap();

        assert_eq!((*first, *second), (1, 1));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_parallel_access() {
        let counter = Arc::new(AtomicU32::new(0));
        let cache = QueryCache::<String, u32>::new("test", 10, Duration::from_secs(3600));
        let tasks: Vec<_> = (0..10)
            .map(|_| cache.get("k0".to_string(), |_| count_fetch(counter.clone())))
            .collect();

        try_join_all(tasks)
            .await
            .expect("a task failed");

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_fetch_is_not_cached() {
        let counter = Arc::new(AtomicU32::new(0));
        let cache = QueryCache::<String, u32>::new("test", 10, Duration::from_secs(3600));

        let res = cache
            .get("k0".to_string(), |_| async { Err::<u32, _>(FetchError) })
            .await;
        assert!(res.is_err());

        let value = cache
            .get("k0".to_string(), |_| count_fetch(counter.clone()))
            .await
            .unwrap();
        assert_eq!(*value, 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_invalidate_refetches() {
        let counter = Arc::new(AtomicU32::new(0));
        let cache = QueryCache::<String, u32>::new("test", 10, Duration::from_secs(3600));
        cache
            .get("k0".to_string(), |_| count_fetch(counter.clone()))
            .await
            .unwrap();

        cache.invalidate(&"k0".to_string());
        let value = cache
            .get("k0".to_string(), |_| count_fetch(counter.clone()))
            .await
            .unwrap();

        assert_eq!(*value, 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_ttl_expiry() {
        let counter = Arc::new(AtomicU32::new(0));
        let cache = QueryCache::<String, u32>::new("test", 10, Duration::from_millis(50));
        cache
            .get("k0".to_string(), |_| count_fetch(counter.clone()))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        let value = cache
            .get("k0".to_string(), |_| count_fetch(counter.clone()))
            .await
            .unwrap();

        assert_eq!(*value, 2);
    }
}
