use imagejob_core::types::{JobHandle, Timestamp};
use serde::Serialize;

/// Where the tracked job currently is in its lifecycle.
///
/// Exactly one variant is current at any instant. Presentation reads it
/// through [`JobTracker::status`](crate::JobTracker::status); only the
/// tracker's transitions write it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    /// Nothing submitted, or the last job was reset or cancelled.
    Idle,
    /// A submit call is in flight.
    Submitting,
    /// The endpoint accepted the job and it is being polled.
    Processing {
        handle: JobHandle,
        started_at: Timestamp,
    },
    /// The job finished and produced an image.
    Succeeded { artifact_url: String },
    /// Submission or a status poll failed.
    Failed { reason: String },
}

impl JobStatus {
    /// `Succeeded` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// Handle of the job being polled, if any.
    pub fn handle(&self) -> Option<&JobHandle> {
        match self {
            Self::Processing { handle, .. } => Some(handle),
            _ => None,
        }
    }
}
