//! Typed decoding of named job events.
//!
//! The job service sends three named events over the stream: `status`
//! (incremental status/progress/metrics), `result` (terminal payload)
//! and `error` (failure description). Anything else is forwarded as
//! [`StreamEvent::Unknown`] so new server-side event types never crash
//! the adapter.

use serde::Deserialize;

use newsinsight_core::{JobStatus, JobUpdate};

use crate::sse::SseFrame;

/// Incremental status update (status, progress, metrics).
pub const EVENT_STATUS: &str = "status";

/// Terminal result payload.
pub const EVENT_RESULT: &str = "result";

/// Failure description.
pub const EVENT_ERROR: &str = "error";

/// A decoded stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A recognized event, decoded into a reducer update.
    Update(JobUpdate),
    /// An event name this client does not understand. Callers should
    /// log it at debug level and continue.
    Unknown { name: String },
}

/// A single event payload could not be parsed.
///
/// Per the error-handling policy this is logged and dropped by the
/// caller; it never closes the stream or affects job status.
#[derive(Debug, thiserror::Error)]
#[error("Malformed {event} event payload: {source}")]
pub struct DecodeError {
    /// The event name whose payload failed to parse.
    pub event: String,
    source: serde_json::Error,
}

/// Payload of a `result` event.
#[derive(Debug, Deserialize)]
struct ResultPayload {
    /// Explicit status, if the server sends one. Defaults to
    /// `completed` — a result payload implies the job finished.
    status: Option<JobStatus>,
    progress: Option<f64>,
    result: serde_json::Value,
}

/// Payload of an `error` event.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    /// Explicit status, if the server sends one. Defaults to `failed`.
    status: Option<JobStatus>,
    message: String,
}

/// Decode one frame into a typed [`StreamEvent`].
pub fn decode_frame(frame: &SseFrame) -> Result<StreamEvent, DecodeError> {
    let decode = |source| DecodeError {
        event: frame.event.clone(),
        source,
    };

    match frame.event.as_str() {
        EVENT_STATUS => {
            let update: JobUpdate = serde_json::from_str(&frame.data).map_err(decode)?;
            Ok(StreamEvent::Update(update))
        }
        EVENT_RESULT => {
            let payload: ResultPayload = serde_json::from_str(&frame.data).map_err(decode)?;
            Ok(StreamEvent::Update(JobUpdate {
                status: Some(payload.status.unwrap_or(JobStatus::Completed)),
                progress: payload.progress,
                result: Some(payload.result),
                ..Default::default()
            }))
        }
        EVENT_ERROR => {
            let payload: ErrorPayload = serde_json::from_str(&frame.data).map_err(decode)?;
            Ok(StreamEvent::Update(JobUpdate {
                status: Some(payload.status.unwrap_or(JobStatus::Failed)),
                error_message: Some(payload.message),
                ..Default::default()
            }))
        }
        other => Ok(StreamEvent::Unknown {
            name: other.to_string(),
        }),
    }
}
