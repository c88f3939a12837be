//! Shared helpers for tracker integration tests.
//!
//! [`ScriptedTransport`] answers submit and poll calls from queues set up
//! by each test and records when every call happened, so tests can run
//! on a paused tokio clock and assert exact timings.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use imagejob_client::{Accepted, JobTransport, PollOutcome, TransportError};
use imagejob_core::request::JobRequest;
use imagejob_core::types::JobHandle;
use imagejob_tracker::{JobTracker, TrackerConfig, TrackerEvent};
use tokio::sync::{broadcast, Notify};
use tokio::time::Instant;

#[derive(Default)]
pub struct ScriptedTransport {
    submits: Mutex<VecDeque<Result<Accepted, TransportError>>>,
    polls: Mutex<VecDeque<Result<PollOutcome, TransportError>>>,
    submitted: Mutex<Vec<JobRequest>>,
    polled: Mutex<Vec<(JobHandle, Instant)>>,
    /// When set, every poll waits for a permit before answering.
    poll_gate: Option<Arc<Notify>>,
    /// When set, every submit waits for a permit before answering.
    submit_gate: Option<Arc<Notify>>,
    /// Simulated round-trip time of every poll.
    poll_latency: Duration,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose polls block until `gate` is notified.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            poll_gate: Some(gate),
            ..Self::default()
        }
    }

    /// A transport whose submits block until `gate` is notified.
    pub fn submit_gated(gate: Arc<Notify>) -> Self {
        Self {
            submit_gate: Some(gate),
            ..Self::default()
        }
    }

    /// A transport whose polls take `latency` to answer.
    pub fn slow_polls(latency: Duration) -> Self {
        Self {
            poll_latency: latency,
            ..Self::default()
        }
    }

    pub fn accept(&self, key: &str) {
        self.submits.lock().unwrap().push_back(Ok(Accepted {
            handle: JobHandle::new(key),
        }));
    }

    pub fn reject(&self, err: TransportError) {
        self.submits.lock().unwrap().push_back(Err(err));
    }

    pub fn answer_poll(&self, answer: Result<PollOutcome, TransportError>) {
        self.polls.lock().unwrap().push_back(answer);
    }

    pub fn answer_done(&self, url: &str) {
        self.answer_poll(Ok(PollOutcome::Done {
            artifact_url: url.to_string(),
        }));
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn submitted(&self) -> Vec<JobRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.polled.lock().unwrap().len()
    }

    pub fn polled(&self) -> Vec<(JobHandle, Instant)> {
        self.polled.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobTransport for ScriptedTransport {
    async fn submit(&self, request: &JobRequest) -> Result<Accepted, TransportError> {
        self.submitted.lock().unwrap().push(request.clone());
        if let Some(gate) = self.submit_gate.clone() {
            gate.notified().await;
        }
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TransportError::UnexpectedShape))
    }

    async fn poll(&self, handle: &JobHandle) -> Result<PollOutcome, TransportError> {
        self.polled
            .lock()
            .unwrap()
            .push((handle.clone(), Instant::now()));
        if let Some(gate) = self.poll_gate.clone() {
            gate.notified().await;
        }
        if !self.poll_latency.is_zero() {
            tokio::time::sleep(self.poll_latency).await;
        }
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PollOutcome::StillProcessing))
    }
}

pub fn tracker(transport: &Arc<ScriptedTransport>) -> JobTracker<ScriptedTransport> {
    JobTracker::new(Arc::clone(transport), TrackerConfig::default())
}

/// Let simulated time pass. With the clock paused, every timer due in
/// the meantime fires in order before this returns.
pub async fn advance(secs: f64) {
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}

/// Collect every event published so far.
pub fn drain(rx: &mut broadcast::Receiver<TrackerEvent>) -> Vec<TrackerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Progress percentages among `events`, in order.
pub fn progress_values(events: &[TrackerEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            TrackerEvent::Progress { percent } => Some(*percent),
            _ => None,
        })
        .collect()
}

/// Seconds between consecutive poll dispatches.
pub fn poll_gaps(transport: &ScriptedTransport) -> Vec<u64> {
    transport
        .polled()
        .windows(2)
        .map(|w| (w[1].1 - w[0].1).as_secs())
        .collect()
}

pub fn count_succeeded(events: &[TrackerEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, TrackerEvent::Succeeded { .. }))
        .count()
}
