//! Optimistic mutation against a cached resource.
//!
//! The pattern: snapshot the current cache entry, install the
//! optimistic value, run the remote call, and on failure restore the
//! snapshot. Implemented once here instead of being re-rolled at every
//! call site that toggles something.

use std::future::Future;

use crate::cache::{CacheKey, QueryCache};

/// Apply `optimistic` to the cache entry at `key`, then run `remote`.
///
/// On success the remote call's output is returned and the optimistic
/// value stays in place — the caller typically overwrites it with the
/// server-confirmed value. On failure the previous entry is restored
/// (or the key invalidated if there was none) and the error is
/// propagated unchanged.
pub async fn optimistic_update<T, R, E, F, Fut>(
    cache: &QueryCache<T>,
    key: &CacheKey,
    optimistic: T,
    remote: F,
) -> Result<R, E>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let snapshot = cache.get(key);
    cache.insert(key.clone(), optimistic);

    match remote().await {
        Ok(confirmed) => Ok(confirmed),
        Err(e) => {
            match snapshot {
                Some(previous) => cache.insert(key.clone(), previous),
                None => cache.invalidate(key),
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cache() -> QueryCache<i32> {
        QueryCache::new(Duration::from_secs(60))
    }

    fn key() -> CacheKey {
        CacheKey::new("counter", ["main"])
    }

    #[tokio::test]
    async fn success_keeps_optimistic_value() {
        let cache = cache();
        cache.insert(key(), 1);

        let result: Result<&str, &str> =
            optimistic_update(&cache, &key(), 2, || async { Ok("confirmed") }).await;

        assert_eq!(result, Ok("confirmed"));
        assert_eq!(cache.get(&key()), Some(2));
    }

    #[tokio::test]
    async fn failure_restores_snapshot() {
        let cache = cache();
        cache.insert(key(), 1);

        let result: Result<(), &str> =
            optimistic_update(&cache, &key(), 2, || async { Err("rejected") }).await;

        assert_eq!(result, Err("rejected"));
        assert_eq!(cache.get(&key()), Some(1));
    }

    #[tokio::test]
    async fn failure_without_snapshot_invalidates() {
        let cache = cache();

        let result: Result<(), &str> =
            optimistic_update(&cache, &key(), 2, || async { Err("rejected") }).await;

        assert_eq!(result, Err("rejected"));
        assert_eq!(cache.get(&key()), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn optimistic_value_visible_during_remote_call() {
        let cache = cache();
        cache.insert(key(), 1);

        let result: Result<i32, &str> = optimistic_update(&cache, &key(), 2, || async {
            // A concurrent reader sees the optimistic value while the
            // remote call is in flight.
            Ok(cache.get(&key()).unwrap())
        })
        .await;

        assert_eq!(result, Ok(2));
    }
}
