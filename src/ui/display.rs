use indicatif::{ProgressBar, ProgressStyle};

use crate::emotion::PLACEHOLDER;
use crate::playback::Display;

/// Progress bar plus the current label, confidence and emoji.
pub struct TerminalDisplay {
    bar: ProgressBar,
    hidden: bool,
    label: String,
    confidence: String,
    emoji: Option<String>,
    progress: u32,
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::with_visibility(false)
    }

    /// Tracks state without drawing anything.
    pub fn hidden() -> Self {
        Self::with_visibility(true)
    }

    fn with_visibility(hidden: bool) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            hidden,
            label: PLACEHOLDER.to_string(),
            confidence: PLACEHOLDER.to_string(),
            emoji: None,
            progress: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn confidence(&self) -> &str {
        &self.confidence
    }

    pub fn emoji(&self) -> Option<&str> {
        self.emoji.as_deref()
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Shown when an upload fails.
    pub fn notice(&self, message: &str) {
        if self.hidden {
            log::warn!("{}", message);
        } else {
            self.bar.suspend(|| eprintln!("{}", message));
        }
    }

    fn message(&self) -> String {
        format!("{} · Confidence: {}", self.label, self.confidence)
    }
}

impl Display for TerminalDisplay {
    fn begin_run(&mut self, frame_count: usize) {
        self.progress = 0;
        if self.hidden {
            return;
        }
        self.bar = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        self.bar.set_style(style);
        log::debug!("Display ready for {} frames", frame_count);
    }

    fn show_label(&mut self, label: &str, confidence: &str) {
        self.label = label.to_string();
        self.confidence = confidence.to_string();
        self.bar.set_message(self.message());
    }

    fn show_emoji(&mut self, asset: &str) {
        if self.emoji.as_deref() == Some(asset) {
            return;
        }
        log::debug!("Emoji -> {}", asset);
        self.emoji = Some(asset.to_string());
    }

    fn show_progress(&mut self, percent: u32) {
        self.progress = percent.min(100);
        self.bar.set_position(self.progress as u64);
    }

    fn end_run(&mut self) {
        self.bar.finish_with_message(self.message());
    }
}
