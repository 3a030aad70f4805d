//! Console streaming display and startup spinner

use aura_application::ports::chat_progress::ChatProgress;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Prints streamed response chunks to stdout as they arrive.
pub struct ConsoleProgress;

impl ConsoleProgress {
    pub fn new() -> Self {
        Self
    }

    fn flush() {
        let _ = std::io::stdout().flush();
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatProgress for ConsoleProgress {
    fn on_stream_start(&self) {
        print!("{} ", "Aura:".yellow().bold());
        Self::flush();
    }

    fn on_chunk(&self, chunk: &str) {
        print!("{}", chunk);
        Self::flush();
    }

    fn on_stream_end(&self) {
        println!();
    }
}

/// Spinner shown while the availability check and session creation run.
pub struct StartupSpinner {
    bar: ProgressBar,
}

impl StartupSpinner {
    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
    }

    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::spinner_style());
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Stop the spinner, leaving the terminal clean.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
