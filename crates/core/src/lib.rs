//! Domain types and pure logic for the NewsInsight job client.
//!
//! This crate holds everything the transport and orchestration layers
//! share without itself depending on any of them: job identifiers and
//! statuses, the [`JobRecord`](record::JobRecord) data model, the pure
//! state reducer that folds stream updates into records, and submission
//! parameter validation. Zero internal dependencies, no I/O.

pub mod error;
pub mod record;
pub mod reducer;
pub mod request;
pub mod types;

pub use error::CoreError;
pub use record::JobRecord;
pub use reducer::{reduce, JobUpdate};
pub use types::{JobId, JobKind, JobStatus};
