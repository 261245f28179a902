use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;

/// Keyed read-through cache for remotely fetched collections.
///
/// `get_with` returns the cached value or runs the supplied fetch;
/// `invalidate` drops a key so the next `get_with` consults the source of
/// truth again. Cached contents are never mutated in place.
///
/// The lock is released across the fetch await point. Overlapping fetches
/// for the same key are last-write-wins; callers run on a single UI task,
/// so the only writer is the invalidation step after a successful create.
pub struct ListCache<K, V> {
    entries: Mutex<HashMap<K, Arc<V>>>,
}

impl<K, V> Default for ListCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ListCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value without fetching.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.lock().insert(key, Arc::clone(&value));
        value
    }

    /// Marks a key stale. A missing key is a no-op.
    pub fn invalidate(&self, key: &K) {
        self.entries.lock().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Returns the cached value for `key`, running `fetch` only when the
    /// key is absent. A failed fetch caches nothing; the next call
    /// refetches.
    pub async fn get_with<F, Fut>(&self, key: K, fetch: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(hit) = self.peek(&key) {
            return Ok(hit);
        }

        let value = fetch().await?;
        Ok(self.insert(key, value))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::anyhow;

    use super::*;

    #[tokio::test]
    async fn fetches_once_until_invalidated() {
        let cache = ListCache::<&str, Vec<u32>>::new();
        let fetches = AtomicUsize::new(0);

        for _ in 0..3 {
            let list = cache
                .get_with("numbers", || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await
                .expect("get_with");
            assert_eq!(list.len(), 3);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        cache.invalidate(&"numbers");
        cache
            .get_with("numbers", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(vec![4])
            })
            .await
            .expect("refetch");
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_fetch_caches_nothing() {
        let cache = ListCache::<&str, Vec<u32>>::new();

        let result = cache
            .get_with("numbers", || async { Err(anyhow!("offline")) })
            .await;
        assert!(result.is_err());
        assert!(cache.peek(&"numbers").is_none());

        let list = cache
            .get_with("numbers", || async { Ok(vec![7]) })
            .await
            .expect("recovered fetch");
        assert_eq!(*list, vec![7]);
    }

    #[tokio::test]
    async fn invalidate_unknown_key_is_noop() {
        let cache = ListCache::<&str, Vec<u32>>::new();
        cache.invalidate(&"never-seen");
        assert!(cache.peek(&"never-seen").is_none());
    }

    #[test]
    fn keys_are_independent() {
        let cache = ListCache::<&str, u32>::new();
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.invalidate(&"a");
        assert!(cache.peek(&"a").is_none());
        assert_eq!(cache.peek(&"b").map(|v| *v), Some(2));
    }
}
