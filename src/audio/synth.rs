//! Live tone output.
//!
//! The output context (device stream and voice mixer) is opened on the
//! first tone and kept until the synthesizer is dropped. The app holds one
//! synthesizer for the whole process, so every run and replay shares it.
//! New tones never cut off ringing ones.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::tone::{tone_len, ToneSpec};
use crate::playback::ToneSink;

/// One ringing tone.
#[derive(Clone, Debug)]
struct Voice {
    spec: ToneSpec,
    position: usize,
}

/// Sums every active voice; finished voices are dropped.
#[derive(Debug)]
pub struct Mixer {
    sample_rate: u32,
    voices: Vec<Voice>,
}

#[cfg_attr(not(feature = "live-audio"), allow(dead_code))]
impl Mixer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            voices: Vec::new(),
        }
    }

    pub fn start(&mut self, spec: ToneSpec) {
        self.voices.push(Voice { spec, position: 0 });
    }

    /// Start a tone on a mixer shared with the device callback. A poisoned
    /// lock drops the tone.
    pub fn start_shared(mixer: &Mutex<Mixer>, spec: ToneSpec) {
        let guard = mixer.lock();
        if let Ok(mut mixer) = guard {
            mixer.start(spec);
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn next_sample(&mut self) -> f32 {
        let sr = self.sample_rate as f32;
        let len = tone_len(self.sample_rate);
        let mut out = 0.0f32;
        let mut i = 0;
        while i < self.voices.len() {
            let voice = &mut self.voices[i];
            out += voice.spec.sample_at(voice.position as f32 / sr);
            voice.position += 1;
            if voice.position >= len {
                self.voices.swap_remove(i);
                continue;
            }
            i += 1;
        }
        out.clamp(-1.0, 1.0)
    }
}

#[cfg(feature = "live-audio")]
mod device {
    use std::sync::{Arc, Mutex};

    use anyhow::{Context, Result};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::Sample;

    use super::Mixer;

    /// Keeps the device stream alive.
    pub struct OutputContext {
        _stream: cpal::Stream,
    }

    pub fn open() -> Result<(OutputContext, Arc<Mutex<Mixer>>)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No audio output device found")?;
        let config = device
            .default_output_config()
            .context("Failed to get audio output config")?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        let mixer = Arc::new(Mutex::new(Mixer::new(sample_rate)));

        log::info!(
            "Audio: {} @ {}Hz",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate
        );

        let err_fn = |err| log::warn!("Audio stream error: {}", err);
        let format = config.sample_format();
        let config: cpal::StreamConfig = config.into();
        let shared = mixer.clone();
        let stream = match format {
            cpal::SampleFormat::F32 => build::<f32>(&device, &config, channels, shared, err_fn)?,
            cpal::SampleFormat::I16 => build::<i16>(&device, &config, channels, shared, err_fn)?,
            cpal::SampleFormat::U16 => build::<u16>(&device, &config, channels, shared, err_fn)?,
            other => anyhow::bail!("Unsupported sample format: {:?}", other),
        };
        stream.play().context("Failed to start audio stream")?;

        Ok((OutputContext { _stream: stream }, mixer))
    }

    fn build<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        channels: usize,
        mixer: Arc<Mutex<Mixer>>,
        err_fn: impl FnMut(cpal::StreamError) + Send + 'static,
    ) -> Result<cpal::Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let Ok(mut mixer) = mixer.lock() else {
                    return;
                };
                for frame in data.chunks_mut(channels) {
                    let value = T::from_sample(mixer.next_sample());
                    for sample in frame.iter_mut() {
                        *sample = value;
                    }
                }
            },
            err_fn,
            None,
        )?;
        Ok(stream)
    }
}

enum State {
    Unopened,
    #[cfg(feature = "live-audio")]
    Open {
        _context: device::OutputContext,
        mixer: Arc<Mutex<Mixer>>,
    },
    Unavailable,
}

/// Plays tones on the default output device.
pub struct ToneSynthesizer {
    state: State,
}

impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneSynthesizer {
    pub fn new() -> Self {
        Self {
            state: State::Unopened,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, State::Unopened | State::Unavailable)
    }

    fn open(&mut self) {
        #[cfg(feature = "live-audio")]
        {
            self.state = match device::open() {
                Ok((context, mixer)) => State::Open {
                    _context: context,
                    mixer,
                },
                Err(err) => {
                    log::warn!("Live audio unavailable, tones will be silent: {:#}", err);
                    State::Unavailable
                }
            };
        }
        #[cfg(not(feature = "live-audio"))]
        {
            log::warn!("Built without the 'live-audio' feature; tones will be silent");
            self.state = State::Unavailable;
        }
    }

    fn mixer(&self) -> Option<Arc<Mutex<Mixer>>> {
        match &self.state {
            #[cfg(feature = "live-audio")]
            State::Open { mixer, .. } => Some(mixer.clone()),
            _ => None,
        }
    }
}

impl ToneSink for ToneSynthesizer {
    fn play(&mut self, label: &str, _at: Duration) {
        if matches!(self.state, State::Unopened) {
            self.open();
        }
        let Some(mixer) = self.mixer() else {
            return;
        };
        Mixer::start_shared(&mixer, ToneSpec::for_label(label));
    }
}
