//! Domain types shared by the image job client and tracker.
//!
//! Holds the validated [`request::JobRequest`], the opaque
//! [`types::JobHandle`] issued by the remote endpoint, and the
//! [`error::CoreError`] raised before anything touches the network.

pub mod error;
pub mod request;
pub mod types;
