use imagejob_client::TransportError;
use imagejob_core::error::CoreError;

/// Errors returned directly to the caller of a tracker operation.
///
/// Poll failures are not returned here; they arrive asynchronously as
/// [`TrackerEvent::Failed`](crate::TrackerEvent::Failed).
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The request was rejected before reaching the network.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The submit call failed.
    #[error("Request failed: {0}")]
    Transport(#[from] TransportError),

    /// Another submission, a cancel, or a reset replaced this one while
    /// its submit call was in flight. The answer was discarded.
    #[error("Submission superseded by a newer request")]
    Superseded,

    /// `retry` was called but no request has been submitted yet.
    #[error("No previous request to retry")]
    NothingToRetry,

    /// The tracker was shut down and accepts no more work.
    #[error("Tracker has been shut down")]
    ShutDown,
}
