//! Spinner display for downloads

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while a source is being downloaded
pub struct DownloadSpinner {
    pb: ProgressBar,
}

impl DownloadSpinner {
    /// Start a spinner with `message`
    ///
    /// Draws to stderr, and nothing when `hidden` is set (e.g. verbose logging
    /// is on and would interleave with the spinner).
    pub fn start(message: &str, hidden: bool) -> Self {
        let pb = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    /// Stop and clear the spinner
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.pb.abandon();
    }
}
