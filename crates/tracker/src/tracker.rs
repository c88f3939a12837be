//! The submit / poll state machine.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──accepted──▶ Processing ──done──▶ Succeeded
//!                      │                      │  ▲                  │
//!                      │ rejected        poll │  │ still processing │
//!                      ▼                      ▼  │                  │
//!                    Failed ◀──poll error─────┘──┘                  │
//!                      │                                            │
//!                      └────────────── reset / cancel ──────────────┴──▶ Idle
//! ```
//!
//! Each accepted job runs two spawned tasks: a poll loop (first poll
//! after [`TrackerConfig::first_poll_delay`], then every
//! [`TrackerConfig::poll_interval`] measured from one poll dispatch to
//! the next) and a progress ticker. Both belong to the submission's
//! [`JobScope`] and re-check it under the state lock before touching
//! anything, so a late answer for an abandoned job is dropped.

use std::sync::Arc;

use chrono::Utc;
use imagejob_client::{Accepted, JobTransport, PollOutcome};
use imagejob_core::request::JobRequest;
use imagejob_core::types::JobHandle;
use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::events::{TrackerEvent, ACCEPTED_TEXT, STILL_PROCESSING_TEXT};
use crate::progress;
use crate::status::JobStatus;
use crate::timers::{JobScope, TimerArena};

/// Broadcast channel capacity for tracker events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Tracks a single image job at a time from submission to a terminal
/// state.
///
/// Cheap to clone; clones share the same job. Independent trackers
/// share nothing.
pub struct JobTracker<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for JobTracker<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<T> {
    transport: Arc<T>,
    config: TrackerConfig,
    state: Mutex<TrackerState>,
    event_tx: broadcast::Sender<TrackerEvent>,
    /// Parent of every job scope; cancelled on shutdown.
    root: CancellationToken,
}

struct TrackerState {
    status: JobStatus,
    progress: u8,
    /// Last request that passed validation, kept for `retry`.
    last_request: Option<JobRequest>,
    timers: TimerArena,
}

impl TrackerState {
    /// Whether an answer produced under `scope` for `handle` may still
    /// be applied.
    fn owns(&self, scope: &JobScope, handle: &JobHandle) -> bool {
        self.timers.is_current(scope) && self.status.handle() == Some(handle)
    }
}

impl<T: JobTransport> JobTracker<T> {
    pub fn new(transport: Arc<T>, config: TrackerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            shared: Arc::new(Shared {
                transport,
                config,
                state: Mutex::new(TrackerState {
                    status: JobStatus::Idle,
                    progress: 0,
                    last_request: None,
                    timers: TimerArena::new(),
                }),
                event_tx,
                root: CancellationToken::new(),
            }),
        }
    }

    /// Subscribe to tracker events.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Snapshot of the current status.
    pub async fn status(&self) -> JobStatus {
        self.shared.state.lock().await.status.clone()
    }

    /// Latest progress estimate. Frozen once the job leaves `Processing`.
    pub async fn progress(&self) -> u8 {
        self.shared.state.lock().await.progress
    }

    /// Validate the two messages and submit them.
    ///
    /// Invalid input is rejected without any network call and leaves the
    /// tracker untouched.
    pub async fn submit(&self, message1: &str, message2: &str) -> Result<JobHandle, TrackerError> {
        let request = JobRequest::new(message1, message2).inspect_err(|e| {
            tracing::warn!(error = %e, "Rejected image job request");
        })?;
        self.submit_request(request).await
    }

    /// Submit an already validated request.
    ///
    /// Any job currently tracked is cancelled first. Returns the handle
    /// once the endpoint has accepted the job; polling then continues in
    /// the background and its outcome arrives as events.
    pub async fn submit_request(&self, request: JobRequest) -> Result<JobHandle, TrackerError> {
        if self.shared.root.is_cancelled() {
            return Err(TrackerError::ShutDown);
        }

        let scope = {
            let mut state = self.shared.state.lock().await;
            if !matches!(state.status, JobStatus::Idle) {
                if !state.status.is_terminal() {
                    tracing::info!(
                        status = ?state.status,
                        "Cancelling active image job for a new submission",
                    );
                }
                self.shared.return_to_idle(&mut state);
            }
            let scope = state.timers.begin(&self.shared.root);
            state.status = JobStatus::Submitting;
            state.progress = 0;
            state.last_request = Some(request.clone());
            self.shared.emit(TrackerEvent::Submitting);
            scope
        };

        tracing::info!(generation = scope.generation, "Submitting image job");
        let result = self.shared.transport.submit(&request).await;

        let mut state = self.shared.state.lock().await;
        if !state.timers.is_current(&scope) {
            tracing::debug!(
                generation = scope.generation,
                "Discarding superseded submit response",
            );
            return Err(TrackerError::Superseded);
        }

        match result {
            Ok(Accepted { handle }) => {
                state.status = JobStatus::Processing {
                    handle: handle.clone(),
                    started_at: Utc::now(),
                };
                state.progress = 0;
                self.shared.emit(TrackerEvent::Processing {
                    handle: handle.clone(),
                });
                self.shared.emit(TrackerEvent::StatusMessage {
                    text: ACCEPTED_TEXT.to_string(),
                });
                drop(state);

                let anchor = Instant::now();
                tokio::spawn(run_poll_loop(
                    Arc::clone(&self.shared),
                    scope.clone(),
                    handle.clone(),
                    anchor,
                ));
                tokio::spawn(run_progress_ticker(Arc::clone(&self.shared), scope, anchor));

                tracing::info!(
                    handle = %handle,
                    first_poll_secs = self.shared.config.first_poll_delay.as_secs(),
                    "Tracking image job",
                );
                Ok(handle)
            }
            Err(e) => {
                self.shared.fail(&mut state, format!("Request failed: {e}"));
                Err(TrackerError::Transport(e))
            }
        }
    }

    /// Resubmit the last valid request.
    ///
    /// With nothing to resubmit the tracker is reset to `Idle` and
    /// [`TrackerError::NothingToRetry`] is returned.
    pub async fn retry(&self) -> Result<JobHandle, TrackerError> {
        let last = self.shared.state.lock().await.last_request.clone();
        match last {
            Some(request) => self.submit_request(request).await,
            None => {
                self.reset().await;
                Err(TrackerError::NothingToRetry)
            }
        }
    }

    /// Stop tracking the current job and return to `Idle`.
    ///
    /// Pending timers are cancelled and any answer still in flight is
    /// discarded. The last request is kept so it can be retried. A no-op
    /// when already idle.
    pub async fn cancel(&self) {
        let mut state = self.shared.state.lock().await;
        if matches!(state.status, JobStatus::Idle) {
            return;
        }
        tracing::info!(status = ?state.status, "Cancelling tracked image job");
        self.shared.return_to_idle(&mut state);
    }

    /// Start over: cancel any tracked job, forget the last request and
    /// clear the handle, result, error and progress.
    pub async fn reset(&self) {
        let mut state = self.shared.state.lock().await;
        state.last_request = None;
        self.shared.return_to_idle(&mut state);
    }

    /// Stop every timer for good. No further events are published and
    /// later submissions fail with [`TrackerError::ShutDown`].
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down job tracker");
        self.shared.root.cancel();
        self.shared.state.lock().await.timers.invalidate();
    }
}

impl<T> Shared<T> {
    fn emit(&self, event: TrackerEvent) {
        // Ignore the SendError: it only means there are zero receivers.
        let _ = self.event_tx.send(event);
    }

    fn return_to_idle(&self, state: &mut TrackerState) {
        state.timers.invalidate();
        state.status = JobStatus::Idle;
        state.progress = 0;
        self.emit(TrackerEvent::Reset);
    }

    fn succeed(&self, state: &mut TrackerState, artifact_url: String) {
        state.timers.invalidate();
        tracing::info!(artifact_url = %artifact_url, "Image job succeeded");
        state.status = JobStatus::Succeeded {
            artifact_url: artifact_url.clone(),
        };
        self.emit(TrackerEvent::Succeeded { artifact_url });
    }

    fn fail(&self, state: &mut TrackerState, reason: String) {
        state.timers.invalidate();
        tracing::warn!(reason = %reason, "Image job failed");
        state.status = JobStatus::Failed {
            reason: reason.clone(),
        };
        self.emit(TrackerEvent::Failed { reason });
    }
}

/// Poll `handle` until it resolves or `scope` is retired.
///
/// Polls are serial and dispatched on a fixed grid: the next one is due
/// `poll_interval` after the previous one was sent, regardless of how
/// long it took to answer. A poll slower than the interval is followed
/// immediately by the next.
async fn run_poll_loop<T: JobTransport>(
    shared: Arc<Shared<T>>,
    scope: JobScope,
    handle: JobHandle,
    anchor: Instant,
) {
    let mut due = anchor + shared.config.first_poll_delay;
    let mut polls: u32 = 0;

    loop {
        tokio::select! {
            _ = scope.cancel.cancelled() => {
                tracing::debug!(handle = %handle, "Poll timer cancelled");
                return;
            }
            _ = tokio::time::sleep_until(due) => {}
        }

        // An in-flight poll is allowed to finish even if the job is
        // abandoned meanwhile; its answer is checked against the scope.
        let dispatched_at = Instant::now();
        let outcome = shared.transport.poll(&handle).await;
        polls += 1;

        {
            let mut state = shared.state.lock().await;
            if !state.owns(&scope, &handle) {
                tracing::debug!(handle = %handle, "Discarding stale poll response");
                return;
            }

            match outcome {
                Ok(PollOutcome::StillProcessing) => {
                    if shared.config.max_polls.is_some_and(|max| polls >= max) {
                        shared.fail(&mut state, format!("Gave up after {polls} status checks"));
                        return;
                    }
                    tracing::debug!(handle = %handle, polls, "Image job still processing");
                    shared.emit(TrackerEvent::StatusMessage {
                        text: STILL_PROCESSING_TEXT.to_string(),
                    });
                }
                Ok(PollOutcome::Done { artifact_url }) => {
                    shared.succeed(&mut state, artifact_url);
                    return;
                }
                Err(e) => {
                    shared.fail(&mut state, format!("Status check failed: {e}"));
                    return;
                }
            }
        }

        due = dispatched_at + shared.config.poll_interval;
    }
}

/// Publish a progress estimate every tick until the scope is retired or
/// the freeze point is reached.
async fn run_progress_ticker<T: JobTransport>(
    shared: Arc<Shared<T>>,
    scope: JobScope,
    anchor: Instant,
) {
    let mut ticker = tokio::time::interval(shared.config.progress_tick);

    loop {
        tokio::select! {
            _ = scope.cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let elapsed = anchor.elapsed();
        let mut state = shared.state.lock().await;
        if !state.timers.is_current(&scope) || state.status.handle().is_none() {
            return;
        }

        let percent = progress::estimate(elapsed, shared.config.progress_ramp).max(state.progress);
        state.progress = percent;
        shared.emit(TrackerEvent::Progress { percent });

        if elapsed >= shared.config.progress_freeze_after {
            tracing::debug!(percent, "Progress estimate frozen");
            return;
        }
    }
}
