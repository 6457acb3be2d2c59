//! The authoritative client-side view of a single backend job.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{JobId, JobKind, JobStatus};

/// Merged state of one tracked job.
///
/// A record is created when a start-job call returns an id, mutated
/// exclusively by [`reduce`](crate::reducer::reduce) as stream events
/// arrive, and replaced wholesale only by an authoritative fetch. Once
/// `status` is terminal the reducer refuses all further changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Server-assigned job identifier.
    pub id: JobId,
    /// What kind of job this is.
    pub kind: JobKind,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Completion percentage in `0.0..=100.0`, monotonically
    /// non-decreasing while the job is non-terminal.
    pub progress: f64,
    /// Open-ended numeric metrics (documents scanned, epoch loss, ...),
    /// merged key-wise with last-write-wins.
    #[serde(default)]
    pub metrics: HashMap<String, f64>,
    /// Final payload, present only once the job completed.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Failure description, present only when the job failed.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl JobRecord {
    /// Fresh record for a newly submitted job, status [`JobStatus::Pending`].
    pub fn new(id: impl Into<JobId>, kind: JobKind) -> Self {
        Self::with_status(id, kind, JobStatus::Pending)
    }

    /// Fresh record seeded with the initial status reported by the
    /// start-job response.
    pub fn with_status(id: impl Into<JobId>, kind: JobKind, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            kind,
            status,
            progress: 0.0,
            metrics: HashMap::new(),
            result: None,
            error_message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_pending_at_zero() {
        let record = JobRecord::new("job-1", JobKind::Search);
        assert_eq!(record.id, "job-1");
        assert_eq!(record.status, JobStatus::Pending);
        assert_eq!(record.progress, 0.0);
        assert!(record.metrics.is_empty());
        assert!(record.result.is_none());
        assert!(record.error_message.is_none());
    }

    #[test]
    fn with_status_seeds_initial_status() {
        let record = JobRecord::with_status("job-2", JobKind::Training, JobStatus::Initializing);
        assert_eq!(record.status, JobStatus::Initializing);
    }

    #[test]
    fn record_deserializes_without_optional_fields() {
        let json = r#"{"id":"j1","kind":"search","status":"running","progress":40.0}"#;
        let record: JobRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, JobStatus::Running);
        assert_eq!(record.progress, 40.0);
        assert!(record.metrics.is_empty());
    }
}
