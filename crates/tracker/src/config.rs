use std::time::Duration;

/// Delay between acceptance and the first status poll. The endpoint is
/// known to need roughly this long before any job can be done.
pub const DEFAULT_FIRST_POLL_DELAY: Duration = Duration::from_secs(60);
/// Delay between the end of one poll and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
/// How often the progress estimate is recomputed.
pub const DEFAULT_PROGRESS_TICK: Duration = Duration::from_secs(1);
/// Elapsed time at which the estimate would reach 100% if uncapped.
pub const DEFAULT_PROGRESS_RAMP: Duration = Duration::from_secs(60);
/// Elapsed time after which the estimate stops updating.
pub const DEFAULT_PROGRESS_FREEZE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Timing parameters for a [`JobTracker`](crate::JobTracker).
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub first_poll_delay: Duration,
    pub poll_interval: Duration,
    pub progress_tick: Duration,
    pub progress_ramp: Duration,
    pub progress_freeze_after: Duration,
    /// Give up after this many `processing` answers. `None` polls for as
    /// long as the job stays in progress.
    pub max_polls: Option<u32>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            first_poll_delay: DEFAULT_FIRST_POLL_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            progress_tick: DEFAULT_PROGRESS_TICK,
            progress_ramp: DEFAULT_PROGRESS_RAMP,
            progress_freeze_after: DEFAULT_PROGRESS_FREEZE_AFTER,
            max_polls: None,
        }
    }
}
