//! Event-stream adapter for a single job's update channel.
//!
//! [`EventStreamClient`] holds the connection configuration for the job
//! service. Call [`EventStreamClient::open`] with a job id to establish
//! a live [`EventStreamConnection`] over a long-lived HTTP GET with a
//! `text/event-stream` body.

use std::collections::VecDeque;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use newsinsight_core::JobId;

use crate::sse::{SseFrame, SseParser};

type BodyStream = Pin<Box<dyn Stream<Item = reqwest::Result<bytes::Bytes>> + Send>>;

/// Configuration handle for opening job event streams.
pub struct EventStreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl EventStreamClient {
    /// Create a new client targeting the job service.
    ///
    /// * `base_url` - HTTP base URL, e.g. `http://host:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling with the REST client).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// HTTP base URL of the job service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open the event stream for a job.
    ///
    /// Generates a unique `client_id` (UUID v4) and appends it as a
    /// query parameter so the service can distinguish subscribers.
    /// Fails with [`StreamError::Connection`] if the transport cannot
    /// be established or the service answers with a non-2xx status.
    pub async fn open(&self, job_id: &str) -> Result<EventStreamConnection, StreamError> {
        if job_id.trim().is_empty() {
            return Err(StreamError::InvalidJobId);
        }

        let client_id = uuid::Uuid::new_v4().to_string();
        let url = format!(
            "{}/api/v1/jobs/{}/events?client_id={}",
            self.base_url, job_id, client_id
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| {
                StreamError::Connection(format!("Failed to connect to event stream at {url}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Connection(format!(
                "Event stream handshake for job {job_id} failed with HTTP {status}"
            )));
        }

        tracing::info!(
            job_id = %job_id,
            client_id = %client_id,
            "Connected to job event stream",
        );

        Ok(EventStreamConnection {
            job_id: job_id.to_string(),
            client_id,
            body: Some(Box::pin(response.bytes_stream())),
            parser: SseParser::new(),
            pending: VecDeque::new(),
        })
    }
}

/// A live event stream for one job.
///
/// Frames are pulled with [`next_frame`](Self::next_frame). Dropping
/// the connection (or calling [`close`](Self::close)) releases the
/// underlying transport; no frames are delivered afterwards.
pub struct EventStreamConnection {
    /// The job this stream belongs to.
    pub job_id: JobId,
    /// Unique client ID sent during the handshake.
    pub client_id: String,
    body: Option<BodyStream>,
    parser: SseParser,
    pending: VecDeque<SseFrame>,
}

impl std::fmt::Debug for EventStreamConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStreamConnection")
            .field("job_id", &self.job_id)
            .field("client_id", &self.client_id)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .field("parser", &self.parser)
            .field("pending", &self.pending)
            .finish()
    }
}

impl EventStreamConnection {
    /// Pull the next complete frame from the stream.
    ///
    /// Returns `Ok(None)` when the server ends the stream (or after
    /// [`close`](Self::close)), and [`StreamError::Connection`] on a
    /// transport error mid-stream.
    pub async fn next_frame(&mut self) -> Result<Option<SseFrame>, StreamError> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Ok(Some(frame));
            }

            let Some(body) = self.body.as_mut() else {
                return Ok(None);
            };

            match body.next().await {
                Some(Ok(chunk)) => {
                    self.pending.extend(self.parser.push(&chunk));
                }
                Some(Err(e)) => {
                    self.release();
                    return Err(StreamError::Connection(format!(
                        "Event stream for job {} dropped: {e}",
                        self.job_id
                    )));
                }
                None => {
                    self.release();
                    return Ok(None);
                }
            }
        }
    }

    /// Close the stream. Idempotent; any buffered frames are discarded
    /// and subsequent [`next_frame`](Self::next_frame) calls return
    /// `Ok(None)`.
    pub fn close(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.body = None;
        self.pending.clear();
    }
}

/// Errors from the event-stream transport layer.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The stream could not be established or was lost.
    #[error("Connection error: {0}")]
    Connection(String),

    /// `open` was called with an empty job id.
    #[error("Job id must not be empty")]
    InvalidJobId,
}
