//! Events broadcast by the job monitor.
//!
//! Subscribers (rendering code, the watch binary, tests) receive every
//! state change without polling [`snapshot`](crate::JobMonitor::snapshot).

use chrono::{DateTime, Utc};
use serde::Serialize;

use newsinsight_core::{JobId, JobRecord};

/// A timestamped monitor event.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorEvent {
    /// When the monitor published the event (UTC).
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub kind: MonitorEventKind,
}

impl MonitorEvent {
    pub(crate) fn new(kind: MonitorEventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// The payload of a monitor event.
#[derive(Debug, Clone, Serialize)]
pub enum MonitorEventKind {
    /// A tracked job's record changed; carries the full merged record.
    JobUpdated { record: JobRecord },

    /// The event stream for a job was (re)established.
    StreamConnected { job_id: JobId },

    /// The event stream for a job was closed or lost.
    StreamDisconnected { job_id: JobId },
}
