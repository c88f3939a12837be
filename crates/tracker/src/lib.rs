//! Lifecycle tracking for asynchronously generated image jobs.
//!
//! [`JobTracker`] submits a request through a
//! [`JobTransport`](imagejob_client::JobTransport), waits for the
//! endpoint's minimum processing time, then polls at a fixed interval
//! until the job finishes or fails. While waiting it publishes a
//! time-based progress estimate. Every state change is broadcast as a
//! [`TrackerEvent`]; presentation code subscribes and never mutates the
//! tracker directly.

pub mod config;
pub mod error;
pub mod events;
pub mod progress;
pub mod status;
pub mod timers;
pub mod tracker;

pub use config::TrackerConfig;
pub use error::TrackerError;
pub use events::TrackerEvent;
pub use status::JobStatus;
pub use tracker::JobTracker;
