//! In-process cache with time-based expiry.
//!
//! [`MemoryCache`] keeps entries in a [`moka`] cache that drops them once
//! their time-to-live has passed.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache as MokaCache;

use crate::{Cache, CacheBucket};

struct Entry {
    etag: String,
    value: Vec<u8>,
}

/// Entries keyed by `(bucket, key)`.
type Store = MokaCache<(String, String), Arc<Entry>>;

/// In-memory [`Cache`] whose entries expire after a fixed time-to-live.
///
/// All buckets handed out by one `MemoryCache` share its storage, so a value
/// written through one handle is visible through another handle of the same
/// bucket name.
#[derive(Clone)]
pub struct MemoryCache {
    store: Store,
}

impl MemoryCache {
    /// Create an empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let store = MokaCache::builder()
            .time_to_live(ttl)
            .eviction_listener(|key: Arc<(String, String)>, _value, cause| {
                tracing::debug!(bucket = %key.0, key = %key.1, ?cause, "cache entry evicted");
            })
            .build();
        Self { store }
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            store: self.store.clone(),
        })
    }
}

struct MemoryCacheBucket {
    name: String,
    store: Store,
}

impl MemoryCacheBucket {
    fn store_key(&self, key: &str) -> (String, String) {
        (self.name.clone(), key.to_owned())
    }
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let entry = self.store.get(&self.store_key(key))?;
        if !etag.is_empty() && entry.etag != etag {
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        let entry = Entry {
            etag: etag.to_owned(),
            value: value.to_vec(),
        };
        self.store.insert(self.store_key(key), Arc::new(entry));
    }

    fn remove(&self, key: &str) {
        self.store.invalidate(&self.store_key(key));
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_memory_bucket_set_and_get() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        let bucket = cache.bucket("content");

        bucket.set("blog:hello:downloaded", "", b"[]");

        assert_eq!(bucket.get("blog:hello:downloaded", ""), Some(b"[]".to_vec()));
    }

    #[test]
    fn test_memory_bucket_etag_mismatch_misses() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        let bucket = cache.bucket("content");

        bucket.set("key", "abc", b"data");

        assert_eq!(bucket.get("key", "def"), None);
        assert_eq!(bucket.get("key", "abc"), Some(b"data".to_vec()));
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new(Duration::from_millis(20));
        let bucket = cache.bucket("content");

        bucket.set("key", "", b"data");
        thread::sleep(Duration::from_millis(100));

        assert_eq!(bucket.get("key", ""), None);
    }

    #[test]
    fn test_refresh_after_expiry_is_kept() {
        let cache = MemoryCache::new(Duration::from_millis(20));
        let reader = cache.bucket("content");
        let writer = cache.bucket("content");

        writer.set("key", "", b"stale");
        thread::sleep(Duration::from_millis(100));
        assert_eq!(reader.get("key", ""), None);

        writer.set("key", "", b"fresh");

        assert_eq!(reader.get("key", ""), Some(b"fresh".to_vec()));
        assert_eq!(reader.get("key", ""), Some(b"fresh".to_vec()));
    }

    #[test]
    fn test_handles_share_storage() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.bucket("content").set("key", "", b"shared");

        assert_eq!(cache.bucket("content").get("key", ""), Some(b"shared".to_vec()));
        assert_eq!(cache.bucket("other").get("key", ""), None);
    }

    #[test]
    fn test_remove_drops_entry() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        let bucket = cache.bucket("content");

        bucket.set("key", "", b"data");
        bucket.remove("key");

        assert_eq!(bucket.get("key", ""), None);
    }
}
