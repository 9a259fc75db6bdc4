use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use super::tone::ToneSpec;
use crate::analysis::result::AnalysisResult;
use crate::playback::schedule::FramePlan;
use crate::playback::ToneSink;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Offline tone recorder: every tone is mixed into a mono buffer at its
/// frame offset, overlapping exactly as it would on the speakers.
pub struct ToneTrack {
    sample_rate: u32,
    buffer: Vec<f32>,
    tones: usize,
}

impl ToneTrack {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            buffer: Vec::new(),
            tones: 0,
        }
    }

    /// The tones `runs` back-to-back runs over `result` would trigger (the
    /// first run plus its replays), padded to their full length.
    pub fn for_result(result: &AnalysisResult, runs: u32, sample_rate: u32) -> Self {
        let mut track = Self::new(sample_rate);
        let run_length = run_length(result);
        for run in 0..runs {
            let start = run_length * run;
            for step in FramePlan::new(result) {
                track.play(step.label, start + step.at);
            }
        }
        track.extend_to(run_length * runs);
        track
    }

    pub fn samples(&self) -> &[f32] {
        &self.buffer
    }

    pub fn tone_count(&self) -> usize {
        self.tones
    }

    /// Pad the track with silence so it lasts at least `duration`.
    pub fn extend_to(&mut self, duration: Duration) {
        let len = self.offset_of(duration);
        if self.buffer.len() < len {
            self.buffer.resize(len, 0.0);
        }
    }

    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
        for &sample in &self.buffer {
            writer.write_sample(sample.clamp(-1.0, 1.0))?;
        }
        writer.finalize().context("Failed to finalize WAV file")?;

        log::info!(
            "Wrote {} tones ({:.1}s) to {}",
            self.tones,
            self.buffer.len() as f32 / self.sample_rate as f32,
            path.display()
        );
        Ok(())
    }

    fn offset_of(&self, at: Duration) -> usize {
        (at.as_secs_f64() * self.sample_rate as f64).round() as usize
    }
}

impl ToneSink for ToneTrack {
    fn play(&mut self, label: &str, at: Duration) {
        let start = self.offset_of(at);
        let tone = ToneSpec::for_label(label).render(self.sample_rate);
        let end = start + tone.len();
        if self.buffer.len() < end {
            self.buffer.resize(end, 0.0);
        }
        for (dst, src) in self.buffer[start..end].iter_mut().zip(tone) {
            *dst += src;
        }
        self.tones += 1;
    }
}

/// Wall time one run over `result` takes: every frame, including the last
/// frame's wait.
pub fn run_length(result: &AnalysisResult) -> Duration {
    let plan = FramePlan::new(result);
    plan.delay() * plan.frame_count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tones_land_at_their_offsets() {
        let mut track = ToneTrack::new(1000);
        track.play("Happy", Duration::ZERO);
        track.play("Sad", Duration::from_secs(2));
        assert_eq!(track.tone_count(), 2);
        assert_eq!(track.samples().len(), 2700);
        // Silence between the first tone's stop and the second's start.
        assert!(track.samples()[700..2000].iter().all(|&s| s == 0.0));
        assert!(track.samples()[2001] != 0.0);
    }

    #[test]
    fn close_tones_overlap() {
        let mut track = ToneTrack::new(1000);
        track.play("Neutral", Duration::ZERO);
        track.play("Neutral", Duration::from_millis(200));
        assert_eq!(track.samples().len(), 900);

        let alone = ToneSpec::for_label("Neutral").render(1000);
        let mixed = track.samples()[250];
        let expected = alone[250] + alone[50];
        assert!((mixed - expected).abs() < 1e-6);
    }

    #[test]
    fn extend_pads_with_silence() {
        let mut track = ToneTrack::new(100);
        track.play("Sad", Duration::ZERO);
        track.extend_to(Duration::from_secs(3));
        assert_eq!(track.samples().len(), 300);
        track.extend_to(Duration::from_secs(1));
        assert_eq!(track.samples().len(), 300);
    }

    #[test]
    fn track_for_a_result_follows_the_frame_plan() {
        let result = AnalysisResult::new(vec![0.0; 6], 3)
            .with_duration(6.0)
            .with_labels([Some("Happy"), Some("Neutral"), Some("Sad")]);
        let track = ToneTrack::for_result(&result, 1, 100);
        assert_eq!(track.tone_count(), 3);
        assert_eq!(track.samples().len(), 600);
        assert_ne!(track.samples()[201], 0.0);
        assert_eq!(track.samples()[150], 0.0);

        let silent = ToneTrack::for_result(&AnalysisResult::new(Vec::new(), 3), 4, 100);
        assert_eq!(silent.tone_count(), 0);
        assert!(silent.samples().is_empty());
    }

    #[test]
    fn replays_follow_the_first_run() {
        let result = AnalysisResult::new(vec![0.0; 6], 3)
            .with_duration(6.0)
            .with_labels([Some("Happy"), Some("Neutral"), Some("Sad")]);
        assert_eq!(run_length(&result), Duration::from_secs(6));

        let once = ToneTrack::for_result(&result, 1, 100);
        let thrice = ToneTrack::for_result(&result, 3, 100);
        assert_eq!(thrice.tone_count(), 9);
        assert_eq!(thrice.samples().len(), 1800);
        assert_eq!(&thrice.samples()[600..1200], once.samples());
        assert_eq!(&thrice.samples()[1200..], once.samples());
    }

    #[test]
    fn writes_a_float_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tones.wav");
        let mut track = ToneTrack::new(8000);
        track.play("Happy", Duration::ZERO);
        track.write_wav(&path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len() as usize, 5600);
    }
}
