//! REST API client for the job service endpoints.

use serde::{Deserialize, Serialize};

use newsinsight_core::record::JobRecord;
use newsinsight_core::request::JobRequest;
use newsinsight_core::types::{JobId, JobKind, JobStatus};
use newsinsight_core::CoreError;

/// HTTP client for the job service.
pub struct JobsApi {
    client: reqwest::Client,
    base_url: String,
}

/// Response returned by `POST /api/v1/jobs` after a job is accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct StartJobResponse {
    /// Server-assigned identifier for the new job.
    pub job_id: JobId,
    /// Initial status reported by the server (usually `pending`).
    pub status: JobStatus,
}

/// Query parameters for `GET /api/v1/jobs`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobListQuery {
    /// Filter by job kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<JobKind>,
    /// Maximum number of results. Server default applies when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Number of results to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Job service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A domain-level error, e.g. request validation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl JobsApi {
    /// Create a new API client for the job service.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://host:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across clients).
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

    /// Submit a new job for execution.
    ///
    /// Validates the request locally, then sends `POST /api/v1/jobs`
    /// with `{ kind, parameters }`. Returns the server-assigned job id
    /// and initial status.
    pub async fn submit_job(&self, request: &JobRequest) -> Result<StartJobResponse, ApiError> {
        request.validate()?;

        let response = self
            .client
            .post(format!("{}/api/v1/jobs", self.base_url))
            .json(request)
            .send()
            .await?;

        let started: StartJobResponse = parse_response(response).await?;

        tracing::info!(
            job_id = %started.job_id,
            kind = %request.kind(),
            status = %started.status,
            "Job submitted",
        );

        Ok(started)
    }

    /// Fetch the authoritative record for a job.
    ///
    /// Sends `GET /api/v1/jobs/{id}`. Used as the fallback when the
    /// event stream is unavailable and optionally after a job reaches a
    /// terminal status.
    pub async fn fetch_job(&self, job_id: &str) -> Result<JobRecord, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/v1/jobs/{}", self.base_url, job_id))
            .send()
            .await?;

        parse_response(response).await
    }

    /// Request server-side cancellation of a job.
    ///
    /// Sends `POST /api/v1/jobs/{id}/cancel`. This does not close any
    /// local event stream — the terminal `cancelled` status arrives
    /// through the stream like any other transition.
    pub async fn cancel_job(&self, job_id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!("{}/api/v1/jobs/{}/cancel", self.base_url, job_id))
            .send()
            .await?;

        check_status(response).await
    }

    /// List known jobs, most recent first.
    ///
    /// Sends `GET /api/v1/jobs` with the given filters.
    pub async fn list_jobs(&self, query: &JobListQuery) -> Result<Vec<JobRecord>, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/v1/jobs", self.base_url))
            .query(query)
            .send()
            .await?;

        parse_response(response).await
    }
}

// ---- shared response helpers ----

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or an [`ApiError::Api`] containing the status
/// and body text on failure.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ApiError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

/// Assert the response has a success status code, discarding the body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
    ensure_success(response).await?;
    Ok(())
}
