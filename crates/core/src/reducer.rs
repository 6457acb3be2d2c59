//! Pure merge of incoming stream updates into a [`JobRecord`].
//!
//! The reducer is deterministic and side-effect-free so it can be
//! tested independently of transport concerns. All record mutation in
//! the monitor flows through [`reduce`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::record::JobRecord;
use crate::types::JobStatus;

/// A partial update decoded from one stream event.
///
/// Every field is optional; absent fields leave the record untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobUpdate {
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub metrics: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Fold one update into a record, producing the new record.
///
/// Precedence, applied in order:
///
/// 1. A terminal record is returned unchanged — this guards against
///    late or duplicate events arriving after completion.
/// 2. A status carried by the update is adopted verbatim; the server is
///    the authority on transitions.
/// 3. Progress only moves forward: the new value is
///    `max(current, incoming)`, with the incoming value clamped into
///    `0.0..=100.0` first.
/// 4. Metrics are shallow-merged, per-key last-write-wins.
/// 5. A result payload is adopted only if the status is (or just
///    became) `completed`.
/// 6. An error message is adopted only if the status is (or just
///    became) `failed`.
pub fn reduce(current: &JobRecord, update: &JobUpdate) -> JobRecord {
    if current.status.is_terminal() {
        return current.clone();
    }

    let mut next = current.clone();

    if let Some(status) = update.status {
        next.status = status;
    }

    if let Some(progress) = update.progress {
        let clamped = progress.clamp(0.0, 100.0);
        if clamped > next.progress {
            next.progress = clamped;
        }
    }

    if let Some(metrics) = &update.metrics {
        for (key, value) in metrics {
            next.metrics.insert(key.clone(), *value);
        }
    }

    if update.result.is_some() && next.status == JobStatus::Completed {
        next.result = update.result.clone();
    }

    if update.error_message.is_some() && next.status == JobStatus::Failed {
        next.error_message = update.error_message.clone();
    }

    next
}
