use std::f32::consts::TAU;
use std::time::Duration;

use crate::emotion::Emotion;

/// Gain the envelope decays to.
pub const RAMP_FLOOR: f32 = 0.0001;
/// Time at which the envelope reaches [`RAMP_FLOOR`].
pub const RAMP_END: Duration = Duration::from_millis(600);
/// Time at which the oscillator is stopped.
pub const TONE_STOP: Duration = Duration::from_millis(700);

/// One short sine cue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub gain: f32,
}

impl ToneSpec {
    /// Happy rings high, Sad low, everything else (including the
    /// placeholder) sits in the middle and slightly quieter.
    pub fn for_label(label: &str) -> Self {
        let (frequency_hz, gain) = match Emotion::from_label(label) {
            Some(Emotion::Happy) => (880.0, 0.04),
            Some(Emotion::Sad) => (220.0, 0.04),
            _ => (440.0, 0.03),
        };
        Self { frequency_hz, gain }
    }

    /// Envelope gain `t` seconds after the tone starts.
    pub fn gain_at(&self, t: f32) -> f32 {
        let ramp = RAMP_END.as_secs_f32();
        if t < 0.0 || t >= TONE_STOP.as_secs_f32() {
            0.0
        } else if t >= ramp {
            RAMP_FLOOR
        } else {
            self.gain * (RAMP_FLOOR / self.gain).powf(t / ramp)
        }
    }

    pub fn sample_at(&self, t: f32) -> f32 {
        (TAU * self.frequency_hz * t).sin() * self.gain_at(t)
    }

    /// Render the full tone, up to the stop time, as mono samples.
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let len = tone_len(sample_rate);
        (0..len)
            .map(|i| self.sample_at(i as f32 / sample_rate as f32))
            .collect()
    }
}

/// Number of samples one tone occupies at `sample_rate`.
pub fn tone_len(sample_rate: u32) -> usize {
    (TONE_STOP.as_secs_f64() * sample_rate as f64).round() as usize
}
