//! The tracked-jobs registry and its single mutation path.
//!
//! [`JobMonitor`] is created once and shared via `Arc`. Each tracked
//! job gets its own stream task (spawned by [`track`](JobMonitor::track))
//! and a generation number; a task may only mutate the record whose
//! generation it captured at spawn time, which makes late callbacks
//! from closed streams no-ops instead of races.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

use newsinsight_client::{ApiError, JobsApi, StartJobResponse};
use newsinsight_core::request::JobRequest;
use newsinsight_core::{reduce, JobId, JobKind, JobRecord, JobStatus, JobUpdate};
use newsinsight_stream::EventStreamClient;

use crate::config::MonitorConfig;
use crate::events::{MonitorEvent, MonitorEventKind};
use crate::processor::run_stream_loop;

/// Broadcast channel capacity for monitor events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How long `shutdown` waits for each stream task to exit.
const SHUTDOWN_TASK_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracks a set of concurrently running backend jobs.
///
/// All record mutation flows through [`apply_update`](Self::apply_update)
/// on the single monitor instance; readers get cloned snapshots, so
/// there is exactly one writer per record by construction.
pub struct JobMonitor {
    /// Tracked jobs indexed by job id.
    jobs: RwLock<HashMap<JobId, TrackedJob>>,
    api: JobsApi,
    stream: EventStreamClient,
    config: MonitorConfig,
    event_tx: broadcast::Sender<MonitorEvent>,
    /// Master cancellation token -- cancelled during shutdown.
    cancel: CancellationToken,
    /// Source of per-track generation numbers.
    next_generation: AtomicU64,
}

/// Internal bookkeeping for a single tracked job.
struct TrackedJob {
    record: JobRecord,
    generation: u64,
    /// Per-job cancellation token (child of the master token).
    cancel: CancellationToken,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

/// Result of applying a stream update, steering the stream task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApplyOutcome {
    /// Applied; the job is still non-terminal.
    Active,
    /// The job is now (or already was) in a terminal status.
    Terminal,
    /// The job is no longer tracked under this generation; the caller
    /// must stop delivering events.
    Stale,
}

impl JobMonitor {
    /// Create a monitor over the given REST and stream clients.
    ///
    /// Returns a shared handle; clone the `Arc` into whatever needs to
    /// track or observe jobs.
    pub fn new(api: JobsApi, stream: EventStreamClient, config: MonitorConfig) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Arc::new(Self {
            jobs: RwLock::new(HashMap::new()),
            api,
            stream,
            config,
            event_tx,
            cancel: CancellationToken::new(),
            next_generation: AtomicU64::new(1),
        })
    }

    /// Subscribe to monitor events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    /// Submit a job and immediately begin tracking it.
    pub async fn submit_and_track(
        self: &Arc<Self>,
        request: &JobRequest,
    ) -> Result<StartJobResponse, ApiError> {
        let started = self.api.submit_job(request).await?;
        self.track_with_status(&started.job_id, request.kind(), started.status)
            .await;
        Ok(started)
    }

    /// Begin tracking a job, starting from [`JobStatus::Pending`].
    ///
    /// A no-op if the id is already tracked.
    pub async fn track(self: &Arc<Self>, job_id: &str, kind: JobKind) {
        self.track_with_status(job_id, kind, JobStatus::Pending).await;
    }

    /// Begin tracking a job, seeding the status from the start-job
    /// response. A no-op if the id is already tracked.
    pub async fn track_with_status(
        self: &Arc<Self>,
        job_id: &str,
        kind: JobKind,
        status: JobStatus,
    ) {
        let record = {
            let mut jobs = self.jobs.write().await;
            if jobs.contains_key(job_id) {
                tracing::debug!(job_id = %job_id, "Job already tracked");
                return;
            }

            let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
            let cancel = self.cancel.child_token();
            let record = JobRecord::with_status(job_id, kind, status);

            jobs.insert(
                job_id.to_string(),
                TrackedJob {
                    record: record.clone(),
                    generation,
                    cancel: cancel.clone(),
                    task_handle: None,
                },
            );

            let task = tokio::spawn(run_stream_loop(
                Arc::clone(self),
                job_id.to_string(),
                generation,
                cancel,
            ));
            // The entry cannot have been removed: the write lock is
            // still held.
            if let Some(job) = jobs.get_mut(job_id) {
                job.task_handle = Some(task);
            }

            tracing::info!(job_id = %job_id, kind = %kind, generation, "Tracking job");
            record
        };

        self.publish(MonitorEventKind::JobUpdated { record });
    }

    /// Stop tracking a job and discard its record. Idempotent.
    ///
    /// The stream task is cancelled synchronously; any event it was
    /// about to deliver fails the generation check and is dropped.
    pub async fn untrack(&self, job_id: &str) {
        let removed = self.jobs.write().await.remove(job_id);
        if let Some(job) = removed {
            job.cancel.cancel();
            tracing::info!(job_id = %job_id, "Job untracked");
        }
    }

    /// Read-only view of every tracked record.
    pub async fn snapshot(&self) -> HashMap<JobId, JobRecord> {
        self.jobs
            .read()
            .await
            .iter()
            .map(|(id, job)| (id.clone(), job.record.clone()))
            .collect()
    }

    /// Current record for one job, if tracked.
    pub async fn record(&self, job_id: &str) -> Option<JobRecord> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .map(|job| job.record.clone())
    }

    /// Record for a job only if it is still tracked under the given
    /// generation. Stream tasks use this instead of [`record`](Self::record)
    /// so a stale task never acts on a re-tracked job's state.
    pub(crate) async fn record_for_generation(
        &self,
        job_id: &str,
        generation: u64,
    ) -> Option<JobRecord> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .filter(|job| job.generation == generation)
            .map(|job| job.record.clone())
    }

    /// Gracefully stop all stream tasks and clear the tracked set.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down job monitor");
        self.cancel.cancel();

        let mut jobs = self.jobs.write().await;
        for (id, mut job) in jobs.drain() {
            job.cancel.cancel();
            if let Some(handle) = job.task_handle.take() {
                let _ = tokio::time::timeout(SHUTDOWN_TASK_TIMEOUT, handle).await;
            }
            tracing::debug!(job_id = %id, "Stream task stopped");
        }

        tracing::info!("Job monitor shut down");
    }

    // ---- crate-internal: the single mutation path ----

    /// Fold a stream update into a tracked record.
    ///
    /// Drops the update unless the job is still tracked under the
    /// caller's generation. Terminal records are left untouched (the
    /// reducer's terminal guard); this is an expected race with
    /// in-flight events, not an error.
    pub(crate) async fn apply_update(
        &self,
        job_id: &str,
        generation: u64,
        update: &JobUpdate,
    ) -> ApplyOutcome {
        let (changed, record) = {
            let mut jobs = self.jobs.write().await;
            let Some(job) = jobs.get_mut(job_id) else {
                return ApplyOutcome::Stale;
            };
            if job.generation != generation {
                return ApplyOutcome::Stale;
            }
            if job.record.status.is_terminal() {
                return ApplyOutcome::Terminal;
            }

            let next = reduce(&job.record, update);
            let changed = next != job.record;
            job.record = next.clone();
            (changed, next)
        };

        let terminal = record.status.is_terminal();
        if changed {
            self.publish(MonitorEventKind::JobUpdated { record });
        }

        if terminal {
            ApplyOutcome::Terminal
        } else {
            ApplyOutcome::Active
        }
    }

    /// Mark a job failed with the given message (connection loss or
    /// idle timeout). Goes through the reducer, so a job that already
    /// reached a terminal status is left as-is.
    pub(crate) async fn fail_job(&self, job_id: &str, generation: u64, message: &str) {
        let update = JobUpdate {
            status: Some(JobStatus::Failed),
            error_message: Some(message.to_string()),
            ..Default::default()
        };
        self.apply_update(job_id, generation, &update).await;
    }

    /// Replace a tracked record wholesale with an authoritative fetch.
    ///
    /// This is the only mutation allowed to overwrite a terminal
    /// record; it still honors the generation check.
    pub(crate) async fn replace_record(&self, job_id: &str, generation: u64, record: JobRecord) {
        let replaced = {
            let mut jobs = self.jobs.write().await;
            match jobs.get_mut(job_id) {
                Some(job) if job.generation == generation => {
                    job.record = record.clone();
                    true
                }
                _ => false,
            }
        };

        if replaced {
            self.publish(MonitorEventKind::JobUpdated { record });
        }
    }

    pub(crate) fn publish(&self, kind: MonitorEventKind) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.event_tx.send(MonitorEvent::new(kind));
    }

    pub(crate) fn stream_client(&self) -> &EventStreamClient {
        &self.stream
    }

    pub(crate) fn api(&self) -> &JobsApi {
        &self.api
    }

    pub(crate) fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
