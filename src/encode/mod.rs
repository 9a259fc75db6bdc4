pub mod ffmpeg;
pub mod recorder;
