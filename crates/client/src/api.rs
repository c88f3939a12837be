//! REST client for the image job webhook.
//!
//! Both operations are `POST <endpoint>?<query>` with a JSON content
//! type and an empty body; the query carries either the two request
//! messages or the job key, percent-encoded (a space is `%20`).

use std::time::Duration;

use async_trait::async_trait;
use imagejob_core::request::JobRequest;
use imagejob_core::types::JobHandle;
use reqwest::header::CONTENT_TYPE;

use crate::messages::{classify_poll, classify_submit, parse_response, JobResponse};
use crate::transport::{Accepted, JobTransport, PollOutcome, TransportError};

/// Query parameter carrying the job handle on status polls.
pub const KEY_PARAM: &str = "key";

/// HTTP client for a single job endpoint.
///
/// Holds no per-job state; one instance can serve any number of
/// submissions and polls.
pub struct JobClient {
    client: reqwest::Client,
    endpoint: String,
}

impl JobClient {
    /// Create a client for the given endpoint URL with no request timeout.
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    /// Create a client whose requests fail after `timeout`.
    ///
    /// A timed-out call surfaces as an ordinary
    /// [`TransportError::Request`].
    pub fn with_timeout(endpoint: String, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Endpoint URL this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit a request for image generation.
    pub async fn submit(&self, request: &JobRequest) -> Result<Accepted, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, "Submitting image job");

        let response = self.post(&request.query_pairs()).await?;
        let accepted = classify_submit(response)?;

        tracing::info!(handle = %accepted.handle, "Image job accepted");
        Ok(accepted)
    }

    /// Check the status of an accepted job.
    pub async fn poll(&self, handle: &JobHandle) -> Result<PollOutcome, TransportError> {
        tracing::debug!(handle = %handle, "Polling image job status");

        let response = self.post(&[(KEY_PARAM, handle.as_str())]).await?;
        let outcome = classify_poll(response)?;

        tracing::debug!(handle = %handle, ?outcome, "Poll answered");
        Ok(outcome)
    }

    // ---- private helpers ----

    /// Send an empty-bodied JSON `POST` with the given query and decode
    /// the response body.
    async fn post(&self, query: &[(&str, &str)]) -> Result<JobResponse, TransportError> {
        let response = self
            .client
            .post(self.url_with_query(query))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        Ok(parse_response(&text)?)
    }

    /// `<endpoint>?k1=v1&k2=v2` with every value percent-encoded.
    fn url_with_query(&self, query: &[(&str, &str)]) -> String {
        let pairs: Vec<String> = query
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect();
        format!("{}?{}", self.endpoint, pairs.join("&"))
    }

    /// Ensure the response has a success status code, or turn it into a
    /// [`TransportError::Status`] carrying the body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), body = %body, "Job endpoint returned an error");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl JobTransport for JobClient {
    async fn submit(&self, request: &JobRequest) -> Result<Accepted, TransportError> {
        JobClient::submit(self, request).await
    }

    async fn poll(&self, handle: &JobHandle) -> Result<PollOutcome, TransportError> {
        JobClient::poll(self, handle).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_values_are_percent_encoded() {
        let client = JobClient::new("http://hook.test/x".to_string());

        let url = client.url_with_query(&[
            ("message1", "a red fox & friends"),
            ("message2", "snow/night"),
        ]);

        assert_eq!(
            url,
            "http://hook.test/x?message1=a%20red%20fox%20%26%20friends&message2=snow%2Fnight"
        );
    }

    #[test]
    fn key_is_encoded_on_polls() {
        let client = JobClient::new("http://hook.test/x".to_string());

        let url = client.url_with_query(&[(KEY_PARAM, "k 1+2")]);

        assert_eq!(url, "http://hook.test/x?key=k%201%2B2");
    }
}
