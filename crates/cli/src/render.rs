//! Turns tracker events into terminal output.

use imagejob_tracker::TrackerEvent;

/// Only log progress when it has moved at least this many points.
const PROGRESS_LOG_STEP: u8 = 10;

/// Renders events either as log lines or as JSON lines on stdout.
pub struct Renderer {
    json: bool,
    last_logged_progress: Option<u8>,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            last_logged_progress: None,
        }
    }

    pub fn render(&mut self, event: &TrackerEvent) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "Failed to encode event"),
            }
            return;
        }

        match event {
            TrackerEvent::Submitting => tracing::info!("Sending image generation request"),
            TrackerEvent::Processing { handle } => {
                self.last_logged_progress = None;
                tracing::info!(handle = %handle, "Request accepted");
            }
            TrackerEvent::Progress { percent } => {
                if self.should_log_progress(*percent) {
                    tracing::info!(percent = *percent, "Estimated progress");
                }
            }
            TrackerEvent::StatusMessage { text } => tracing::info!("{text}"),
            TrackerEvent::Succeeded { artifact_url } => {
                tracing::info!("Image ready");
                println!("{artifact_url}");
            }
            TrackerEvent::Failed { reason } => tracing::error!("{reason}"),
            TrackerEvent::Reset => tracing::info!("Request cancelled"),
        }
    }

    fn should_log_progress(&mut self, percent: u8) -> bool {
        let due = match self.last_logged_progress {
            None => true,
            Some(last) => percent >= last.saturating_add(PROGRESS_LOG_STEP),
        };
        if due {
            self.last_logged_progress = Some(percent);
        }
        due
    }
}
