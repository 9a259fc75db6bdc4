use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Encoder settings that do not depend on the run being recorded.
#[derive(Clone, Debug)]
pub struct EncodeSettings {
    pub output: PathBuf,
    pub codec: String,
    pub pix_fmt: String,
    pub crf: u32,
    pub bitrate: Option<String>,
}

pub struct FfmpegEncoder {
    child: Child,
    frames: usize,
}

/// Frame rate that holds every frame on screen for exactly `delay`.
pub fn frame_rate_arg(delay: Duration) -> String {
    format!("1000/{}", delay.as_millis().max(1))
}

pub fn build_args(
    settings: &EncodeSettings,
    width: u32,
    height: u32,
    delay: Duration,
    audio: Option<&Path>,
) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-f".into(), "rawvideo".into(),
        "-pixel_format".into(), "rgba".into(),
        "-video_size".into(), format!("{}x{}", width, height),
        "-framerate".into(), frame_rate_arg(delay),
        "-i".into(), "pipe:0".into(),
    ];

    if let Some(audio) = audio {
        args.extend(["-i".to_string(), audio.display().to_string()]);
    }

    args.extend([
        "-c:v".to_string(), settings.codec.clone(),
        "-pix_fmt".into(), settings.pix_fmt.clone(),
    ]);

    if let Some(ref br) = settings.bitrate {
        args.extend(["-b:v".to_string(), br.clone()]);
    } else {
        args.extend(["-crf".to_string(), settings.crf.to_string()]);
        args.extend(["-preset".to_string(), "medium".to_string()]);
    }

    if audio.is_some() {
        args.extend([
            "-c:a".to_string(), "aac".into(),
            "-b:a".into(), "192k".into(),
            "-shortest".into(),
        ]);
    } else {
        args.push("-an".into());
    }

    args.push(settings.output.display().to_string());
    args
}

impl FfmpegEncoder {
    pub fn new(
        settings: &EncodeSettings,
        width: u32,
        height: u32,
        delay: Duration,
        audio: Option<&Path>,
    ) -> Result<Self> {
        let args = build_args(settings, width, height, delay, audio);

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        log::info!(
            "FFmpeg encoder started: {}x{} @ {} fps, codec={}",
            width,
            height,
            frame_rate_arg(delay),
            settings.codec
        );

        Ok(Self { child, frames: 0 })
    }

    pub fn write_frame(&mut self, rgba_pixels: &[u8]) -> Result<()> {
        let stdin = self.child.stdin.as_mut().context("FFmpeg stdin not available")?;
        stdin.write_all(rgba_pixels).context("Failed to write frame to ffmpeg")?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    pub fn finish(mut self) -> Result<()> {
        // Close stdin to signal EOF
        drop(self.child.stdin.take());

        let output = self.child.wait_with_output().context("Failed to wait for ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("FFmpeg exited with error:\n{}", stderr);
        }

        log::info!("FFmpeg encoding complete ({} frames)", self.frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(bitrate: Option<&str>) -> EncodeSettings {
        EncodeSettings {
            output: PathBuf::from("out.mp4"),
            codec: "libx264".into(),
            pix_fmt: "yuv420p".into(),
            crf: 18,
            bitrate: bitrate.map(String::from),
        }
    }

    #[test]
    fn frame_rate_matches_the_frame_delay() {
        assert_eq!(frame_rate_arg(Duration::from_millis(2000)), "1000/2000");
        assert_eq!(frame_rate_arg(Duration::from_millis(200)), "1000/200");
        assert_eq!(frame_rate_arg(Duration::ZERO), "1000/1");
    }

    #[test]
    fn silent_video_without_a_tone_track() {
        let args = build_args(&settings(None), 640, 160, Duration::from_millis(200), None);
        assert!(args.windows(2).any(|w| w == ["-video_size", "640x160"]));
        assert!(args.windows(2).any(|w| w == ["-crf", "18"]));
        assert!(args.contains(&"-an".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn tone_track_is_muxed_in() {
        let args = build_args(
            &settings(Some("2M")),
            640,
            160,
            Duration::from_millis(200),
            Some(Path::new("tones.wav")),
        );
        assert!(args.windows(2).any(|w| w == ["-i", "tones.wav"]));
        assert!(args.windows(2).any(|w| w == ["-b:v", "2M"]));
        assert!(args.contains(&"-shortest".to_string()));
        assert!(!args.contains(&"-crf".to_string()));
    }
}
