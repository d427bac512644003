//! Events that start a capture.

use std::io::BufRead;
use std::time::Duration;

use anyhow::Context as _;

use crate::{CaptureOutcome, CaptureSession};

/// What starts each capture.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
#[allow(clippy::exhaustive_enums)]
pub enum Trigger {
    /// Capture each time a line (the Enter key) is read from standard input, until the
    /// input ends.
    #[default]
    Stdin,
    /// Capture once and exit.
    Once,
    /// Re-read the scene file periodically and capture whenever the camera has moved.
    Watch,
}

/// Runs one capture per line of `input` until it ends or `max_captures` captures have been
/// made. Returns the number of captures made.
///
/// A capture which fails is logged and does not stop the loop.
pub fn run_line_triggers(
    session: &mut CaptureSession,
    input: impl BufRead,
    max_captures: Option<usize>,
) -> Result<usize, anyhow::Error> {
    let mut count = 0;
    for line in input.lines() {
        line.context("failed to read trigger input")?;
        if log_outcome(session.capture_now()) {
            count += 1;
        }
        if max_captures.is_some_and(|max| count >= max) {
            break;
        }
    }
    Ok(count)
}

/// Polls the session's scene every `interval`, capturing when the camera pose has changed,
/// until `max_captures` captures have been made (or forever if [`None`]). Returns the number
/// of captures made.
///
/// The first poll always captures.
pub fn run_watch(
    session: &mut CaptureSession,
    interval: Duration,
    max_captures: Option<usize>,
) -> usize {
    let mut count = 0;
    loop {
        match session.capture_if_pose_changed() {
            Ok(Some(outcome)) => {
                if log_outcome(Ok(outcome)) {
                    count += 1;
                }
            }
            Ok(None) => log::trace!("camera has not moved"),
            Err(error) => log::warn!("{error:#}"),
        }
        if max_captures.is_some_and(|max| count >= max) {
            return count;
        }
        std::thread::sleep(interval);
    }
}

/// Logs the result of a capture, returning whether it was successful and fully written.
fn log_outcome(result: Result<CaptureOutcome, anyhow::Error>) -> bool {
    match result {
        Ok(CaptureOutcome {
            snapshot: _,
            written: Ok(_),
        }) => true,
        // Already logged by the session.
        Ok(CaptureOutcome {
            snapshot: _,
            written: Err(_),
        }) => false,
        Err(error) => {
            log::error!("capture failed: {error:#}");
            false
        }
    }
}
