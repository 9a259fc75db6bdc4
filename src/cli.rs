use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";
pub const DEFAULT_ASSETS: &str = "static/images";

#[derive(Parser, Debug)]
#[command(name = "emotiva", about = "Replayable playback of an audio emotion analysis")]
pub struct Cli {
    /// Signal file to upload for analysis (CSV, text or .npy)
    pub input: Option<PathBuf>,

    /// Analysis backend base URL
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Play a previously saved analysis response instead of uploading
    #[arg(long, conflicts_with = "input")]
    pub from_json: Option<PathBuf>,

    /// Save the analysis response for later playback
    #[arg(long)]
    pub save_json: Option<PathBuf>,

    /// Replay the cached analysis this many times after the first run
    #[arg(long, default_value_t = 0)]
    pub replays: u32,

    /// Do not wait between frames
    #[arg(long)]
    pub fast: bool,

    /// Do not play tones on the speakers
    #[arg(long)]
    pub mute: bool,

    /// Write the tone track of the run and its replays to a WAV file
    #[arg(long)]
    pub tones_wav: Option<PathBuf>,

    /// Record the waveform animation to a video file (needs ffmpeg)
    #[arg(short, long)]
    pub record: Option<PathBuf>,

    /// Drawing surface width in pixels
    #[arg(long, default_value_t = 900)]
    pub width: u32,

    /// Drawing surface height in pixels
    #[arg(long, default_value_t = 240)]
    pub height: u32,

    /// Directory the emoji images are served from
    #[arg(long, default_value = DEFAULT_ASSETS)]
    pub assets: String,

    /// H.264 CRF quality (0-51, lower = better). Ignored when --bitrate is set.
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// Video bitrate (e.g. 2400k, 5M). When set, uses -b:v instead of -crf.
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,

    /// Title text overlay on recordings
    #[arg(long)]
    pub title: Option<String>,

    /// Show elapsed time on recordings
    #[arg(long)]
    pub show_time: bool,

    /// Font file for recording overlays
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Download the overlay font from this URL
    #[arg(long)]
    pub font_url: Option<String>,

    /// Print the backend's latest analysis summary and exit
    #[arg(long)]
    pub latest: bool,

    /// Check that the backend is up and exit
    #[arg(long)]
    pub health: bool,

    /// Config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
