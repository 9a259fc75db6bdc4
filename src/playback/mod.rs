//! Frame-synchronized playback of a finished analysis.
//!
//! The scheduler drives four collaborators once per frame: the waveform
//! sink, the display, the tone sink and, last, the clock. The clock's
//! `sleep` is the only point at which a run yields.

pub mod cache;
pub mod player;
pub mod schedule;
pub mod scheduler;

use std::time::Duration;

/// Draws the accumulated waveform prefix for one frame.
pub trait WaveformSink {
    fn draw(&mut self, prefix: &[f32]);
}

/// Starts one short cue for a frame's label. `at` is the frame's offset
/// from the start of the run.
pub trait ToneSink {
    fn play(&mut self, label: &str, at: Duration);
}

/// Text, emoji and progress surface.
pub trait Display {
    /// Called once before the first frame of every run.
    fn begin_run(&mut self, _frame_count: usize) {}
    fn show_label(&mut self, label: &str, confidence: &str);
    fn show_emoji(&mut self, asset: &str);
    fn show_progress(&mut self, percent: u32);
    fn end_run(&mut self) {}
}

pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

/// Waits in real time.
#[derive(Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Never waits (`--fast`).
#[derive(Default)]
pub struct InstantClock {
    pub elapsed: Duration,
}

impl Clock for InstantClock {
    fn sleep(&mut self, duration: Duration) {
        self.elapsed += duration;
    }
}

/// The set of collaborators one run writes to.
pub struct Stage<'a> {
    pub waveform: &'a mut dyn WaveformSink,
    pub tones: &'a mut dyn ToneSink,
    pub display: &'a mut dyn Display,
    pub clock: &'a mut dyn Clock,
    /// Directory the emoji assets are served from.
    pub asset_base: &'a str,
}
