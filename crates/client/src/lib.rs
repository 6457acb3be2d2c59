//! REST client for the NewsInsight job and admin services.
//!
//! Wraps the HTTP API (job submission, authoritative fetch,
//! cancellation, listing, source administration) using [`reqwest`],
//! plus the client-side caching building blocks: an explicit TTL query
//! cache and a reusable optimistic-mutation helper.

pub mod api;
pub mod cache;
pub mod optimistic;
pub mod sources;

pub use api::{ApiError, JobListQuery, JobsApi, StartJobResponse};
pub use cache::{CacheKey, QueryCache};
pub use optimistic::optimistic_update;
pub use sources::{NewsSource, SourcesApi};
