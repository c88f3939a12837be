use std::time::Duration;

use clap::Parser;
use imagejob_tracker::TrackerConfig;

/// Command-line arguments, each backed by an environment variable.
///
/// | Env Var                         | Default                  |
/// |---------------------------------|--------------------------|
/// | `IMAGEJOB_ENDPOINT`             | required                 |
/// | `IMAGEJOB_FIRST_POLL_SECS`      | `60`                     |
/// | `IMAGEJOB_POLL_INTERVAL_SECS`   | `15`                     |
/// | `IMAGEJOB_REQUEST_TIMEOUT_SECS` | unset (no timeout)       |
/// | `IMAGEJOB_MAX_POLLS`            | unset (poll until done)  |
#[derive(Debug, Parser)]
#[command(
    name = "imagejob",
    version,
    about = "Submit an image generation job and wait for the result"
)]
pub struct Cli {
    /// First prompt message.
    pub message1: String,

    /// Second prompt message.
    pub message2: String,

    /// Job webhook URL.
    #[arg(long, env = "IMAGEJOB_ENDPOINT")]
    pub endpoint: String,

    /// Seconds to wait after acceptance before the first status check.
    #[arg(long, env = "IMAGEJOB_FIRST_POLL_SECS", default_value_t = 60)]
    pub first_poll_secs: u64,

    /// Seconds between status checks.
    #[arg(long, env = "IMAGEJOB_POLL_INTERVAL_SECS", default_value_t = 15)]
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds.
    #[arg(long, env = "IMAGEJOB_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Give up after this many unfinished status checks.
    #[arg(long, env = "IMAGEJOB_MAX_POLLS")]
    pub max_polls: Option<u32>,

    /// Print every tracker event as a JSON line instead of log output.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

impl Cli {
    /// Tracker timings derived from the arguments.
    pub fn tracker_config(&self) -> Result<TrackerConfig, ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll interval must be at least 1 second"));
        }
        if self.max_polls == Some(0) {
            return Err(ConfigError::Invalid("max polls must be at least 1"));
        }

        Ok(TrackerConfig {
            first_poll_delay: Duration::from_secs(self.first_poll_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            max_polls: self.max_polls,
            ..TrackerConfig::default()
        })
    }

    /// Per-request timeout, if one was configured.
    pub fn request_timeout(&self) -> Result<Option<Duration>, ConfigError> {
        match self.request_timeout_secs {
            Some(0) => Err(ConfigError::Invalid("request timeout must be at least 1 second")),
            Some(secs) => Ok(Some(Duration::from_secs(secs))),
            None => Ok(None),
        }
    }
}
