//! Administrative news-source management.
//!
//! Covers the settings surface of the application: listing configured
//! news sources (cached) and toggling them on or off with an
//! optimistic cache update that rolls back if the server rejects the
//! change.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{parse_response, ApiError};
use crate::cache::{CacheKey, QueryCache};
use crate::optimistic::optimistic_update;

/// How long a cached source list stays fresh.
const SOURCES_CACHE_TTL: Duration = Duration::from_secs(30);

/// Resource kind segment for source cache keys.
const SOURCES_CACHE_KIND: &str = "sources";

/// A configured news source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSource {
    /// Stable source identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the source participates in searches.
    pub enabled: bool,
}

/// HTTP client for the source administration endpoints.
pub struct SourcesApi {
    client: reqwest::Client,
    base_url: String,
    cache: QueryCache<Vec<NewsSource>>,
}

impl SourcesApi {
    /// Create a new API client for source administration.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            cache: QueryCache::new(SOURCES_CACHE_TTL),
        }
    }

    fn list_key() -> CacheKey {
        CacheKey::new(SOURCES_CACHE_KIND, ["list"])
    }

    /// List all configured sources.
    ///
    /// Served from the cache when fresh; otherwise `GET
    /// /api/v1/sources` and the result is cached.
    pub async fn list_sources(&self) -> Result<Vec<NewsSource>, ApiError> {
        let key = Self::list_key();
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let response = self
            .client
            .get(format!("{}/api/v1/sources", self.base_url))
            .send()
            .await?;

        let sources: Vec<NewsSource> = parse_response(response).await?;
        self.cache.insert(key, sources.clone());
        Ok(sources)
    }

    /// Enable or disable a source.
    ///
    /// The cached list is updated optimistically before `PUT
    /// /api/v1/sources/{id}` is issued; on failure the previous list is
    /// restored and the error propagated. On success the cache entry is
    /// confirmed from the server's response.
    pub async fn set_source_enabled(
        &self,
        source_id: &str,
        enabled: bool,
    ) -> Result<NewsSource, ApiError> {
        let key = Self::list_key();
        let current = self.list_sources().await?;

        let mut optimistic = current.clone();
        for source in &mut optimistic {
            if source.id == source_id {
                source.enabled = enabled;
            }
        }

        let confirmed: NewsSource = optimistic_update(&self.cache, &key, optimistic, || async {
            let response = self
                .client
                .put(format!("{}/api/v1/sources/{}", self.base_url, source_id))
                .json(&serde_json::json!({ "enabled": enabled }))
                .send()
                .await?;
            parse_response(response).await
        })
        .await?;

        // Confirm the cache entry with the server's view of the source.
        let mut list = current;
        for source in &mut list {
            if source.id == confirmed.id {
                *source = confirmed.clone();
            }
        }
        self.cache.insert(key, list);

        tracing::info!(
            source_id = %confirmed.id,
            enabled = confirmed.enabled,
            "Source toggled",
        );

        Ok(confirmed)
    }

    /// Drop any cached source data, forcing the next list to refetch.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_kind(SOURCES_CACHE_KIND);
    }
}
