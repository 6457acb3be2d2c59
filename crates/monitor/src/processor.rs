//! Per-job stream task: connect -> read -> reduce -> reconnect.
//!
//! One instance of [`run_stream_loop`] runs per tracked job. It owns
//! the job's event-stream connection and pushes every decoded update
//! through the monitor's single mutation path. The task exits when the
//! job reaches a terminal status, the reconnect budget is exhausted,
//! the idle window elapses, or the job is untracked.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use newsinsight_core::JobId;
use newsinsight_stream::{decode_frame, reconnect_loop, EventStreamConnection, StreamEvent};

use crate::events::MonitorEventKind;
use crate::monitor::{ApplyOutcome, JobMonitor};

pub(crate) async fn run_stream_loop(
    monitor: Arc<JobMonitor>,
    job_id: JobId,
    generation: u64,
    cancel: CancellationToken,
) {
    let mut conn = match connect(&monitor, &job_id, &cancel).await {
        Some(conn) => conn,
        None => {
            handle_connection_lost(&monitor, &job_id, generation, &cancel).await;
            return;
        }
    };
    monitor.publish(MonitorEventKind::StreamConnected {
        job_id: job_id.clone(),
    });

    loop {
        let idle_timeout = monitor.config().idle_timeout;

        let next = tokio::select! {
            _ = cancel.cancelled() => {
                conn.close();
                monitor.publish(MonitorEventKind::StreamDisconnected { job_id });
                return;
            }
            next = tokio::time::timeout(idle_timeout, conn.next_frame()) => next,
        };

        let frame = match next {
            // Idle window elapsed with no events at all.
            Err(_) => {
                tracing::warn!(
                    job_id = %job_id,
                    idle_timeout_secs = idle_timeout.as_secs(),
                    "No events within idle window, treating as lost connection",
                );
                conn.close();
                monitor.fail_job(&job_id, generation, "timeout").await;
                monitor.publish(MonitorEventKind::StreamDisconnected { job_id });
                return;
            }
            Ok(Ok(Some(frame))) => frame,
            // Orderly end of stream, or transport error mid-stream.
            Ok(end_or_err) => {
                if let Err(e) = &end_or_err {
                    tracing::warn!(job_id = %job_id, error = %e, "Event stream dropped");
                }
                monitor.publish(MonitorEventKind::StreamDisconnected {
                    job_id: job_id.clone(),
                });

                if cancel.is_cancelled() || job_is_settled(&monitor, &job_id, generation).await {
                    return;
                }

                match reconnect_loop(
                    monitor.stream_client(),
                    &job_id,
                    &monitor.config().reconnect,
                    &cancel,
                )
                .await
                {
                    Some(new_conn) => {
                        conn = new_conn;
                        monitor.publish(MonitorEventKind::StreamConnected {
                            job_id: job_id.clone(),
                        });
                        continue;
                    }
                    None => {
                        handle_connection_lost(&monitor, &job_id, generation, &cancel).await;
                        return;
                    }
                }
            }
        };

        match decode_frame(&frame) {
            Ok(StreamEvent::Update(update)) => {
                match monitor.apply_update(&job_id, generation, &update).await {
                    ApplyOutcome::Active => {}
                    ApplyOutcome::Terminal => {
                        tracing::info!(job_id = %job_id, "Job reached terminal status");
                        conn.close();
                        if monitor.config().refetch_on_terminal {
                            refetch(&monitor, &job_id, generation).await;
                        }
                        monitor.publish(MonitorEventKind::StreamDisconnected { job_id });
                        return;
                    }
                    ApplyOutcome::Stale => {
                        // Untracked (or re-tracked under a newer
                        // generation) while we were reading.
                        conn.close();
                        return;
                    }
                }
            }
            Ok(StreamEvent::Unknown { name }) => {
                tracing::debug!(job_id = %job_id, event = %name, "Ignoring unknown event type");
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Dropping malformed event payload");
            }
        }
    }
}

/// Initial connect, racing the cancellation token.
async fn connect(
    monitor: &JobMonitor,
    job_id: &str,
    cancel: &CancellationToken,
) -> Option<EventStreamConnection> {
    tokio::select! {
        _ = cancel.cancelled() => None,
        result = monitor.stream_client().open(job_id) => match result {
            Ok(conn) => Some(conn),
            Err(e) => {
                tracing::warn!(
                    job_id = %job_id,
                    error = %e,
                    "Initial stream connect failed, entering reconnect loop",
                );
                reconnect_loop(
                    monitor.stream_client(),
                    job_id,
                    &monitor.config().reconnect,
                    cancel,
                )
                .await
            }
        }
    }
}

/// The stream is gone for good. Fall back to one authoritative fetch;
/// if even that fails, the job is marked failed locally.
async fn handle_connection_lost(
    monitor: &JobMonitor,
    job_id: &str,
    generation: u64,
    cancel: &CancellationToken,
) {
    if cancel.is_cancelled() || job_is_settled(monitor, job_id, generation).await {
        return;
    }

    match monitor.api().fetch_job(job_id).await {
        Ok(record) => {
            tracing::info!(
                job_id = %job_id,
                status = %record.status,
                "Recovered job state via authoritative fetch",
            );
            monitor.replace_record(job_id, generation, record).await;
        }
        Err(e) => {
            tracing::warn!(
                job_id = %job_id,
                error = %e,
                "Authoritative fetch failed, marking job failed",
            );
            monitor.fail_job(job_id, generation, "connection lost").await;
        }
    }
}

/// Replace the streamed record with the authoritative one after a
/// terminal status.
async fn refetch(monitor: &JobMonitor, job_id: &str, generation: u64) {
    match monitor.api().fetch_job(job_id).await {
        Ok(record) => monitor.replace_record(job_id, generation, record).await,
        Err(e) => {
            tracing::warn!(
                job_id = %job_id,
                error = %e,
                "Terminal refetch failed, keeping streamed record",
            );
        }
    }
}

/// Whether the job already settled (terminal) or is no longer tracked
/// under this generation — either way the stream task has nothing left
/// to do.
async fn job_is_settled(monitor: &JobMonitor, job_id: &str, generation: u64) -> bool {
    match monitor.record_for_generation(job_id, generation).await {
        Some(record) => record.status.is_terminal(),
        None => true,
    }
}
