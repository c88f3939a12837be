//! Events published by a [`JobTracker`](crate::JobTracker).
//!
//! These are the entire boundary presentation code depends on. They
//! are delivered over a [`tokio::sync::broadcast`] channel; call
//! [`JobTracker::subscribe`](crate::JobTracker::subscribe) to receive
//! them.

use imagejob_core::types::JobHandle;
use serde::Serialize;

/// Status text published when the endpoint accepts a job.
pub const ACCEPTED_TEXT: &str = "Request accepted, generating image...";
/// Status text published for every poll that finds the job unfinished.
pub const STILL_PROCESSING_TEXT: &str = "Image generation is still in progress...";

/// A caller-visible change in the tracked job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackerEvent {
    /// A submit call was dispatched.
    Submitting,

    /// The endpoint accepted the job; polling is scheduled.
    Processing { handle: JobHandle },

    /// New progress estimate (0-90).
    Progress { percent: u8 },

    /// Human-readable status line.
    StatusMessage { text: String },

    /// The job finished; `artifact_url` points at the generated image.
    Succeeded { artifact_url: String },

    /// The job failed. `reason` is meant to be shown verbatim.
    Failed { reason: String },

    /// The tracker returned to idle after a reset or cancel.
    Reset,
}
