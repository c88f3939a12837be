//! HTTP client for the image job webhook endpoint.
//!
//! Provides the [`transport::JobTransport`] seam the tracker drives,
//! the reqwest-backed [`api::JobClient`] implementing it, and the
//! wire-level response shapes and their classification in
//! [`messages`].

pub mod api;
pub mod messages;
pub mod transport;

pub use api::JobClient;
pub use transport::{Accepted, JobTransport, PollOutcome, TransportError};
