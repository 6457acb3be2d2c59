//! Shared identifier and enumeration types.

use serde::{Deserialize, Serialize};

/// Backend job identifier. Opaque, assigned by the job service.
pub type JobId = String;

/// The kind of long-running backend job being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Unified news search.
    Search,
    /// Multi-pass deep AI analysis of a topic.
    DeepAnalysis,
    /// ML model training run.
    Training,
}

impl JobKind {
    /// Wire name of this kind, as sent in submission payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Search => "search",
            JobKind::DeepAnalysis => "deep-analysis",
            JobKind::Training => "training",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a backend job.
///
/// `pending -> initializing -> running` and from there into one of the
/// four terminal states. The server may also report direct transitions
/// (e.g. `pending -> failed`); status values from the server are always
/// adopted verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Initializing,
    Running,
    Completed,
    Failed,
    Cancelled,
    Timeout,
}

impl JobStatus {
    /// Whether no further updates are expected for a job in this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled | JobStatus::Timeout
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobStatus::Pending => "pending",
            JobStatus::Initializing => "initializing",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(JobStatus::Timeout.is_terminal());
    }

    #[test]
    fn non_terminal_statuses() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Initializing.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&JobStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_string(&JobKind::DeepAnalysis).unwrap();
        assert_eq!(json, "\"deep-analysis\"");
    }

    #[test]
    fn kind_roundtrips_through_as_str() {
        for kind in [JobKind::Search, JobKind::DeepAnalysis, JobKind::Training] {
            let json = format!("\"{}\"", kind.as_str());
            let parsed: JobKind = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, kind);
        }
    }
}
