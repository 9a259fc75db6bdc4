pub mod synth;
pub mod tone;
pub mod track;

use std::time::Duration;

use crate::playback::ToneSink;

/// Drops every tone (`--mute`).
#[derive(Default)]
pub struct Muted;

impl ToneSink for Muted {
    fn play(&mut self, _label: &str, _at: Duration) {}
}
