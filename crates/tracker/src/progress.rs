//! Time-based progress estimate.
//!
//! The endpoint only ever answers "processing" or "done", so progress
//! shown to the user is derived from elapsed time alone. It ramps
//! linearly and is capped below 100 so it never claims completion
//! before the endpoint does.

use std::time::Duration;

/// Highest percentage the estimate will report.
pub const MAX_ESTIMATE_PERCENT: u8 = 90;

/// Estimate completion for a job that has been processing for `elapsed`.
///
/// Computes `min(90, 100 * elapsed / ramp)` in whole percent, rounding
/// down. A zero `ramp` reports the cap immediately.
pub fn estimate(elapsed: Duration, ramp: Duration) -> u8 {
    let ramp_ms = ramp.as_millis();
    if ramp_ms == 0 {
        return MAX_ESTIMATE_PERCENT;
    }
    let percent = elapsed.as_millis().saturating_mul(100) / ramp_ms;
    percent.min(MAX_ESTIMATE_PERCENT as u128) as u8
}
