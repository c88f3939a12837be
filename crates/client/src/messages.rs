//! Job endpoint response bodies and their classification.
//!
//! Both operations answer with a small JSON object keyed on `status`:
//!
//! * submit: `{"status": "processing", "key": "<opaque>"}`
//! * poll:   `{"status": "processing"}` or
//!   `{"status": "done", "image_url": "<url>"}`
//!
//! Any other shape is a [`TransportError::UnexpectedShape`].

use imagejob_core::types::JobHandle;
use serde::Deserialize;

use crate::transport::{Accepted, PollOutcome, TransportError};

/// Status value for a job that is still being generated.
pub const STATUS_PROCESSING: &str = "processing";
/// Status value for a finished job.
pub const STATUS_DONE: &str = "done";

/// Raw response body, shared by submit and poll.
///
/// Every field is optional so that a well-formed JSON object with the
/// wrong fields is reported as a shape mismatch rather than a decode
/// failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Parse a response body into a [`JobResponse`].
pub fn parse_response(text: &str) -> Result<JobResponse, serde_json::Error> {
    serde_json::from_str(text)
}

/// Interpret a submit response.
pub fn classify_submit(response: JobResponse) -> Result<Accepted, TransportError> {
    match (response.status.as_deref(), response.key) {
        (Some(STATUS_PROCESSING), Some(key)) if !key.is_empty() => Ok(Accepted {
            handle: JobHandle::new(key),
        }),
        _ => Err(TransportError::UnexpectedShape),
    }
}

/// Interpret a poll response.
pub fn classify_poll(response: JobResponse) -> Result<PollOutcome, TransportError> {
    match response.status.as_deref() {
        Some(STATUS_DONE) => match response.image_url {
            Some(url) if !url.is_empty() => Ok(PollOutcome::Done { artifact_url: url }),
            _ => Err(TransportError::UnexpectedShape),
        },
        Some(STATUS_PROCESSING) => Ok(PollOutcome::StillProcessing),
        _ => Err(TransportError::UnexpectedShape),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn submit(json: &str) -> Result<Accepted, TransportError> {
        classify_submit(parse_response(json).unwrap())
    }

    fn poll(json: &str) -> Result<PollOutcome, TransportError> {
        classify_poll(parse_response(json).unwrap())
    }

    #[test]
    fn submit_processing_with_key_is_accepted() {
        let accepted = submit(r#"{"status":"processing","key":"k1"}"#).unwrap();
        assert_eq!(accepted.handle.as_str(), "k1");
    }

    #[test]
    fn submit_without_key_is_unexpected() {
        assert_matches!(
            submit(r#"{"status":"processing"}"#),
            Err(TransportError::UnexpectedShape)
        );
    }

    #[test]
    fn submit_with_empty_key_is_unexpected() {
        assert_matches!(
            submit(r#"{"status":"processing","key":""}"#),
            Err(TransportError::UnexpectedShape)
        );
    }

    #[test]
    fn submit_with_done_status_is_unexpected() {
        assert_matches!(
            submit(r#"{"status":"done","key":"k1"}"#),
            Err(TransportError::UnexpectedShape)
        );
    }

    #[test]
    fn poll_done_with_url() {
        assert_eq!(
            poll(r#"{"status":"done","image_url":"https://x/img.png"}"#).unwrap(),
            PollOutcome::Done {
                artifact_url: "https://x/img.png".to_string()
            }
        );
    }

    #[test]
    fn poll_processing() {
        assert_eq!(
            poll(r#"{"status":"processing"}"#).unwrap(),
            PollOutcome::StillProcessing
        );
    }

    #[test]
    fn poll_done_without_url_is_unexpected() {
        assert_matches!(
            poll(r#"{"status":"done"}"#),
            Err(TransportError::UnexpectedShape)
        );
    }

    #[test]
    fn poll_unknown_status_is_unexpected() {
        assert_matches!(
            poll(r#"{"status":"queued"}"#),
            Err(TransportError::UnexpectedShape)
        );
    }

    #[test]
    fn object_without_status_is_unexpected() {
        assert_matches!(poll(r#"{"foo":1}"#), Err(TransportError::UnexpectedShape));
    }

    #[test]
    fn parse_invalid_json_returns_error() {
        assert!(parse_response("not json at all").is_err());
    }

    #[test]
    fn parse_non_object_returns_error() {
        assert!(parse_response("[1, 2, 3]").is_err());
    }
}
