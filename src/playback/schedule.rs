use std::time::Duration;

use crate::analysis::result::AnalysisResult;
use crate::emotion::PLACEHOLDER;

/// Floor on the per-frame delay, bounding render pressure for very short
/// declared durations.
pub const MIN_FRAME_DELAY: Duration = Duration::from_millis(50);

/// `max(50ms, floor(duration * 1000 / frames))`.
pub fn frame_delay(frame_count: usize, duration_secs: f64) -> Duration {
    if frame_count == 0 {
        return MIN_FRAME_DELAY;
    }
    let ms = (duration_secs * 1000.0 / frame_count as f64).floor();
    let ms = if ms.is_finite() && ms > 0.0 { ms as u64 } else { 0 };
    Duration::from_millis(ms).max(MIN_FRAME_DELAY)
}

/// Overall progress after frame `index` (0-based) has been shown, rounded
/// half away from zero.
pub fn progress_percent(index: usize, frame_count: usize) -> u32 {
    if frame_count == 0 {
        return 0;
    }
    (((index + 1) as f64 / frame_count as f64) * 100.0).round() as u32
}

/// Everything the scheduler publishes for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameStep<'a> {
    pub index: usize,
    /// Length of the sample prefix to draw.
    pub upto: usize,
    pub label: &'a str,
    pub confidence: String,
    pub progress: u32,
    /// Offset of this frame from the start of the run.
    pub at: Duration,
}

/// The deterministic frame sequence for one result.
pub struct FramePlan<'a> {
    result: &'a AnalysisResult,
    delay: Duration,
    next: usize,
}

impl<'a> FramePlan<'a> {
    pub fn new(result: &'a AnalysisResult) -> Self {
        Self {
            result,
            delay: frame_delay(result.frame_count, result.duration_secs),
            next: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn frame_count(&self) -> usize {
        if self.result.is_playable() {
            self.result.frame_count
        } else {
            0
        }
    }

    pub fn step(&self, index: usize) -> FrameStep<'a> {
        let result = self.result;
        let upto = result
            .samples
            .len()
            .min((index + 1).saturating_mul(result.frame_length));
        FrameStep {
            index,
            upto,
            label: result.label(index).unwrap_or(PLACEHOLDER),
            confidence: result
                .confidence(index)
                .map(|c| c.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            progress: progress_percent(index, result.frame_count),
            at: self.delay * index as u32,
        }
    }
}

impl<'a> Iterator for FramePlan<'a> {
    type Item = FrameStep<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.frame_count() {
            return None;
        }
        let step = self.step(self.next);
        self.next += 1;
        Some(step)
    }
}
