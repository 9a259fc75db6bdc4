pub mod canvas;
pub mod text;
pub mod waveform;
