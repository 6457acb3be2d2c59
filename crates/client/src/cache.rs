//! Explicit TTL cache for fetched resources.
//!
//! Replaces the ambient, module-global query cache of a typical
//! frontend with an owned abstraction: keys follow the schema
//! `(resource kind, params...)`, entries expire after a fixed TTL, and
//! invalidation is explicit — per key or per resource kind.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Cache key: a static resource kind plus its request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: &'static str,
    params: Vec<String>,
}

impl CacheKey {
    pub fn new<I, S>(kind: &'static str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// The resource kind segment of the key.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

struct Entry<T> {
    value: T,
    inserted_at: Instant,
}

/// A keyed cache with a single time-to-live for all entries.
///
/// Values are cloned out on [`get`](Self::get); interior mutability via
/// a [`Mutex`] (the lock is never held across an await point).
pub struct QueryCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, Entry<T>>>,
}

impl<T: Clone> QueryCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a fresh entry. Expired entries are removed on access and
    /// reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<T> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite an entry, resetting its age.
    pub fn insert(&self, key: CacheKey, value: T) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop a single entry.
    pub fn invalidate(&self, key: &CacheKey) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .remove(key);
    }

    /// Drop every entry of a resource kind (key-prefix invalidation).
    pub fn invalidate_kind(&self, kind: &str) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .retain(|key, _| key.kind != kind);
    }

    /// Drop all entries past their TTL.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .retain(|_, entry| entry.inserted_at.elapsed() < ttl);
    }

    /// Number of entries currently stored, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kind: &'static str, param: &str) -> CacheKey {
        CacheKey::new(kind, [param])
    }

    #[test]
    fn get_returns_inserted_value() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(key("jobs", "list"), 42);
        assert_eq!(cache.get(&key("jobs", "list")), Some(42));
    }

    #[test]
    fn miss_on_unknown_key() {
        let cache: QueryCache<i32> = QueryCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(&key("jobs", "list")), None);
    }

    #[test]
    fn distinct_params_are_distinct_entries() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(key("jobs", "page-1"), 1);
        cache.insert(key("jobs", "page-2"), 2);
        assert_eq!(cache.get(&key("jobs", "page-1")), Some(1));
        assert_eq!(cache.get(&key("jobs", "page-2")), Some(2));
    }

    #[test]
    fn expired_entry_is_a_miss_and_removed() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.insert(key("jobs", "list"), 42);
        assert_eq!(cache.get(&key("jobs", "list")), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_overwrites_and_refreshes() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(key("jobs", "list"), 1);
        cache.insert(key("jobs", "list"), 2);
        assert_eq!(cache.get(&key("jobs", "list")), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_removes_only_that_key() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(key("jobs", "list"), 1);
        cache.insert(key("sources", "list"), 2);

        cache.invalidate(&key("jobs", "list"));
        assert_eq!(cache.get(&key("jobs", "list")), None);
        assert_eq!(cache.get(&key("sources", "list")), Some(2));
    }

    #[test]
    fn invalidate_kind_removes_all_entries_of_kind() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(key("jobs", "page-1"), 1);
        cache.insert(key("jobs", "page-2"), 2);
        cache.insert(key("sources", "list"), 3);

        cache.invalidate_kind("jobs");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("sources", "list")), Some(3));
    }

    #[test]
    fn purge_expired_keeps_fresh_entries() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(key("jobs", "list"), 1);
        cache.purge_expired();
        assert_eq!(cache.len(), 1);

        let cache = QueryCache::new(Duration::ZERO);
        cache.insert(key("jobs", "list"), 1);
        cache.purge_expired();
        assert!(cache.is_empty());
    }
}
