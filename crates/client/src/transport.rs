//! The two remote operations a job tracker needs, as a trait.
//!
//! [`JobClient`](crate::api::JobClient) is the production
//! implementation. Tests substitute a scripted implementation so that
//! the tracker's timing can be exercised without a network.

use async_trait::async_trait;
use imagejob_core::request::JobRequest;
use imagejob_core::types::JobHandle;

/// The endpoint accepted a submission and started processing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub handle: JobHandle,
}

/// Result of a single status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job is not finished yet.
    StillProcessing,
    /// The job finished and the generated image is available.
    Done { artifact_url: String },
}

/// Errors from either remote operation.
///
/// Submit and poll failures are classified identically. The `Display`
/// text is the human-readable cause surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("HTTP error: {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body was not valid JSON of the expected form.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The body decoded but matched none of the documented shapes.
    #[error("unexpected response shape")]
    UnexpectedShape,
}

/// Submit and poll operations against a job endpoint.
#[async_trait]
pub trait JobTransport: Send + Sync + 'static {
    /// Submit a validated request. Succeeds only when the endpoint
    /// reports `processing` together with a non-empty key.
    async fn submit(&self, request: &JobRequest) -> Result<Accepted, TransportError>;

    /// Ask the endpoint for the status of a previously accepted job.
    async fn poll(&self, handle: &JobHandle) -> Result<PollOutcome, TransportError>;
}
