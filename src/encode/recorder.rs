use std::time::Duration;

use anyhow::Result;

use super::ffmpeg::FfmpegEncoder;
use crate::analysis::result::AnalysisResult;
use crate::audio::track::run_length;
use crate::playback::scheduler::CancelToken;
use crate::render::canvas::{Canvas, Rgba};
use crate::render::text::{format_timestamp, TextOverlay};
use crate::render::waveform::FrameTap;

const OVERLAY_COLOR: Rgba = [255, 255, 255, 220];

/// Length of a recording of the first run plus `replays` replays. `None`
/// when the result plays no frames, since ffmpeg rejects an empty stream.
pub fn recording_length(result: &AnalysisResult, replays: u32) -> Option<Duration> {
    if !result.is_playable() {
        return None;
    }
    Some(run_length(result) * (replays + 1))
}

/// Title and elapsed-time captions burned into recorded frames.
pub struct Captions {
    pub overlay: TextOverlay,
    pub title: Option<String>,
    pub show_time: bool,
}

/// Streams every rendered waveform frame into ffmpeg.
pub struct Recorder {
    encoder: Option<FfmpegEncoder>,
    captions: Option<Captions>,
    delay: Duration,
    error: Option<anyhow::Error>,
    cancel: Option<CancelToken>,
}

impl Recorder {
    pub fn new(encoder: FfmpegEncoder, delay: Duration, captions: Option<Captions>) -> Self {
        Self {
            encoder: Some(encoder),
            captions,
            delay,
            error: None,
            cancel: None,
        }
    }

    /// Stop the run when ffmpeg goes away instead of drawing frames nobody records.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Close the encoder, surfacing the first write error if there was one.
    pub fn finish(mut self) -> Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        match self.encoder.take() {
            Some(encoder) => encoder.finish(),
            None => Ok(()),
        }
    }

    fn caption(&self, canvas: &mut Canvas, frame_idx: usize) {
        let Some(ref captions) = self.captions else {
            return;
        };
        let (width, height) = (canvas.width(), canvas.height());
        let margin = (width.min(height) as f32 * 0.07) as u32;
        let overlay = &captions.overlay;

        if let Some(ref title) = captions.title {
            let tw = overlay.measure_width(title);
            let tx = width.saturating_sub(margin + tw);
            overlay.composite(canvas, title, tx, margin, OVERLAY_COLOR);
        }

        if captions.show_time {
            let elapsed = self.delay * frame_idx as u32;
            let time_str = format_timestamp(elapsed.as_secs_f32());
            let tw = overlay.measure_width(&time_str);
            let tx = width.saturating_sub(margin + tw);
            let ty = height.saturating_sub(margin + overlay.line_height());
            overlay.composite(canvas, &time_str, tx, ty, OVERLAY_COLOR);
        }
    }
}

impl FrameTap for Recorder {
    fn frame(&mut self, canvas: &mut Canvas) {
        if self.error.is_some() {
            return;
        }
        let frame_idx = self.encoder.as_ref().map_or(0, FfmpegEncoder::frames_written);
        self.caption(canvas, frame_idx);

        let Some(encoder) = self.encoder.as_mut() else {
            return;
        };
        if let Err(err) = encoder.write_frame(canvas.pixels()) {
            log::warn!("Recording stopped: {:#}", err);
            self.error = Some(err);
            if let Some(ref cancel) = self.cancel {
                cancel.cancel();
            }
        }
    }
}
