//! `imagejob` -- submit an image generation job and wait for the image.
//!
//! Sends the two messages to the job webhook, then follows the job
//! through its polling lifecycle, printing progress until the image URL
//! (exit 0) or an error (exit 1) arrives. Ctrl-C cancels the job.
//!
//! Settings come from command-line flags or the environment (a `.env`
//! file is honoured); see [`config::Cli`].

mod config;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use imagejob_client::JobClient;
use imagejob_tracker::{JobTracker, TrackerError, TrackerEvent};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Cli;
use crate::render::Renderer;

/// Exit code used when the user interrupts the job.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imagejob=info,imagejob_client=info,imagejob_tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "imagejob failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.tracker_config()?;
    let client = match cli.request_timeout()? {
        Some(timeout) => JobClient::with_timeout(cli.endpoint.clone(), timeout)?,
        None => JobClient::new(cli.endpoint.clone()),
    };

    tracing::info!(
        endpoint = %client.endpoint(),
        first_poll_secs = config.first_poll_delay.as_secs(),
        poll_interval_secs = config.poll_interval.as_secs(),
        max_polls = ?config.max_polls,
        "Starting imagejob",
    );

    let tracker = JobTracker::new(Arc::new(client), config);
    let mut events = tracker.subscribe();
    let mut renderer = Renderer::new(cli.json);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            return Ok(interrupt(&tracker).await);
        }
        result = tracker.submit(&cli.message1, &cli.message2) => {
            match result {
                // Reported through the Failed event below.
                Ok(_) | Err(TrackerError::Transport(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                return Ok(interrupt(&tracker).await);
            }
            received = events.recv() => match received {
                Ok(event) => {
                    renderer.render(&event);
                    match event {
                        TrackerEvent::Succeeded { .. } => return Ok(ExitCode::SUCCESS),
                        TrackerEvent::Failed { .. } => return Ok(ExitCode::FAILURE),
                        _ => {}
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event stream lagged");
                }
                Err(RecvError::Closed) => return Ok(ExitCode::FAILURE),
            }
        }
    }
}

/// Cancel the tracked job and stop the tracker before exiting.
async fn interrupt<T: imagejob_client::JobTransport>(tracker: &JobTracker<T>) -> ExitCode {
    tracing::warn!("Interrupted, cancelling job");
    tracker.cancel().await;
    tracker.shutdown().await;
    ExitCode::from(EXIT_INTERRUPTED)
}
