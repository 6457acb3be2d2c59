//! Bounded reconnection for dropped job event streams.
//!
//! When a stream drops while its job is still non-terminal, the monitor
//! calls [`reconnect_loop`] to retry the handshake a fixed number of
//! times with a fixed delay between attempts. The loop never runs for
//! jobs already in a terminal status — the caller checks that before
//! invoking it.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{EventStreamClient, EventStreamConnection};

/// Tunable parameters for the retry policy.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of reconnect attempts before giving up.
    pub max_attempts: u32,
    /// Fixed delay before each attempt.
    pub backoff: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(5),
        }
    }
}

/// Attempt to re-open the event stream for a job.
///
/// Returns `Some(connection)` once a handshake succeeds, or `None` when
/// the attempt budget is exhausted or the `cancel` token fires first.
pub async fn reconnect_loop(
    client: &EventStreamClient,
    job_id: &str,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Option<EventStreamConnection> {
    for attempt in 1..=config.max_attempts {
        // Wait out the backoff, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(job_id = %job_id, "Reconnect cancelled");
                return None;
            }
            _ = tokio::time::sleep(config.backoff) => {}
        }

        tracing::info!(
            job_id = %job_id,
            attempt,
            max_attempts = config.max_attempts,
            "Reconnecting to job event stream",
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(job_id = %job_id, "Reconnect cancelled");
                return None;
            }
            result = client.open(job_id) => {
                match result {
                    Ok(conn) => {
                        tracing::info!(job_id = %job_id, attempt, "Reconnected to job event stream");
                        return Some(conn);
                    }
                    Err(e) => {
                        tracing::warn!(
                            job_id = %job_id,
                            error = %e,
                            "Reconnect attempt {attempt} failed",
                        );
                    }
                }
            }
        }
    }

    tracing::warn!(
        job_id = %job_id,
        attempts = config.max_attempts,
        "Reconnect budget exhausted",
    );
    None
}
