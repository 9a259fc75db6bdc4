mod analysis;
mod audio;
mod cli;
mod config;
mod emotion;
mod encode;
mod playback;
mod render;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::time::Duration;

use analysis::client::AnalysisClient;
use analysis::error::AnalysisError;
use analysis::saved::{save_result, SavedResult};
use analysis::Analyzer;
use audio::synth::ToneSynthesizer;
use audio::track::ToneTrack;
use audio::Muted;
use cli::Cli;
use config::Config;
use encode::ffmpeg::{EncodeSettings, FfmpegEncoder};
use encode::recorder::{recording_length, Captions, Recorder};
use playback::player::Player;
use playback::scheduler::CancelToken;
use playback::schedule::FramePlan;
use playback::{Clock, InstantClock, Stage, ToneSink, WallClock};
use render::canvas::parse_hex_color;
use render::text::{load_font_from_url, TextOverlay};
use render::waveform::{WaveformRenderer, DEFAULT_BACKGROUND, DEFAULT_STROKE};
use ui::display::TerminalDisplay;
use ui::session::{Session, UPLOAD_FAILED};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    let config_path = config::find_config(cli.config.as_deref());
    let cfg = match config_path {
        Some(ref path) => match config::load_config(path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };
    merge_config(&mut cli, &cfg);

    let client = AnalysisClient::new(&cli.server, Duration::from_secs(cfg.server.timeout_secs))?;

    if cli.health {
        let healthy = client.health().context("Health check failed")?;
        println!("{}", if healthy { "ok" } else { "unhealthy" });
        return Ok(());
    }

    if cli.latest {
        let latest = client.latest().context("Failed to fetch latest analysis")?;
        println!("Latest: {} (confidence {:.2})", latest.label, latest.confidence);
        for (i, (label, confidence)) in latest.labels.iter().zip(&latest.confidences).enumerate() {
            println!("  [{:3}] {:<8} {:.2}", i, label, confidence);
        }
        return Ok(());
    }

    log::info!("emotiva - emotion analysis playback");
    log::info!("Surface: {}x{}", cli.width, cli.height);

    match cli.from_json.clone() {
        Some(saved) => run(&cli, &cfg, SavedResult, Some(&saved)),
        None => {
            let input = cli.input.clone();
            run(&cli, &cfg, client, input.as_deref())
        }
    }
}

/// Config values apply only where the CLI is still at its default.
fn merge_config(cli: &mut Cli, cfg: &Config) {
    if cli.server == cli::DEFAULT_SERVER {
        cli.server = cfg.server.url.clone();
    }
    if cli.width == 900 {
        cli.width = cfg.surface.width;
    }
    if cli.height == 240 {
        cli.height = cfg.surface.height;
    }
    if cli.assets == cli::DEFAULT_ASSETS {
        if let Some(ref assets) = cfg.assets {
            cli.assets = assets.clone();
        }
    }
    if !cli.mute {
        cli.mute = cfg.audio.mute;
    }
    if cli.crf == 18 {
        cli.crf = cfg.output.crf;
    }
    if cli.codec == "libx264" {
        cli.codec = cfg.output.codec.clone();
    }
    if cli.pix_fmt == "yuv420p" {
        cli.pix_fmt = cfg.output.pix_fmt.clone();
    }
    if cli.font.is_none() {
        cli.font = cfg.output.font.clone();
    }
    if cli.font_url.is_none() {
        cli.font_url = cfg.output.font_url.clone();
    }
}

fn run<A: Analyzer>(cli: &Cli, cfg: &Config, analyzer: A, file: Option<&Path>) -> Result<()> {
    let mut display = TerminalDisplay::new();
    let cancel = CancelToken::new();
    let mut session = Session::new(analyzer, Player::new().with_cancel(cancel.clone()));

    let result = match session.analyze(file) {
        Ok(result) => result,
        Err(AnalysisError::NoInput) => {
            anyhow::bail!("No input file selected; pass a signal file or --from-json");
        }
        Err(err) if err.is_input_error() => {
            return Err(err).context("Nothing was sent to the analysis backend");
        }
        Err(err) => {
            display.notice(UPLOAD_FAILED);
            return Err(err.into());
        }
    };

    if let Some(ref path) = cli.save_json {
        save_result(&result, path)?;
        log::info!("Saved analysis to {}", path.display());
    }

    // Degenerate results play nothing, so there is nothing to record.
    let record = match cli.record {
        Some(ref output) if !result.is_playable() => {
            log::warn!("Analysis has no frames; not recording {}", output.display());
            None
        }
        ref record => record.as_ref(),
    };

    let runs = cli.replays + 1;
    let sample_rate = cfg.audio.sample_rate;
    let tone_track = if cli.tones_wav.is_some() || record.is_some() {
        Some(ToneTrack::for_result(&result, runs, sample_rate))
    } else {
        None
    };
    if let (Some(track), Some(path)) = (&tone_track, &cli.tones_wav) {
        track.write_wav(path)?;
    }

    // ffmpeg muxes the tone track from a file, so it has to exist before spawn.
    let mux_audio = match (&tone_track, &cli.tones_wav, record) {
        (_, Some(path), Some(_)) => Some(TempOrKept::Kept(path.clone())),
        (Some(track), None, Some(_)) => {
            let file = tempfile::Builder::new()
                .prefix("emotiva-tones-")
                .suffix(".wav")
                .tempfile()
                .context("Failed to create temporary tone track")?;
            track.write_wav(file.path())?;
            Some(TempOrKept::Temp(file))
        }
        _ => None,
    };

    let delay = FramePlan::new(&result).delay();
    let mut recorder = match (record, recording_length(&result, cli.replays)) {
        (Some(output), Some(length)) => {
            log::info!("Recording {:.1}s to {}", length.as_secs_f32(), output.display());
            let settings = EncodeSettings {
                output: output.clone(),
                codec: cli.codec.clone(),
                pix_fmt: cli.pix_fmt.clone(),
                crf: cli.crf,
                bitrate: cli.bitrate.clone(),
            };
            let encoder = FfmpegEncoder::new(
                &settings,
                cli.width,
                cli.height,
                delay,
                mux_audio.as_ref().map(TempOrKept::path),
            )?;
            Some(Recorder::new(encoder, delay, captions(cli)?).with_cancel(cancel.clone()))
        }
        _ => None,
    };

    let stroke = style_color(&cfg.surface.stroke, DEFAULT_STROKE);
    let background = style_color(&cfg.surface.background, DEFAULT_BACKGROUND);
    let mut waveform = WaveformRenderer::new(cli.width, cli.height).with_style(
        stroke,
        background,
        cfg.surface.line_width,
    );
    if let Some(ref mut recorder) = recorder {
        waveform = waveform.with_tap(recorder);
    }

    // The output context lives as long as the process.
    let mut muted = Muted;
    let mut synth = ToneSynthesizer::new();
    let tones: &mut dyn ToneSink = if cli.mute { &mut muted } else { &mut synth };
    let mut instant = InstantClock::default();
    let mut wall = WallClock;
    let clock: &mut dyn Clock = if cli.fast { &mut instant } else { &mut wall };

    let mut stage = Stage {
        waveform: &mut waveform,
        tones,
        display: &mut display,
        clock,
        asset_base: &cli.assets,
    };

    let outcome = session.stream(&mut stage);
    log::info!("Run finished: {:?}", outcome);
    for n in 0..cli.replays {
        if cancel.is_cancelled() {
            break;
        }
        log::info!("Replay {}/{}", n + 1, cli.replays);
        session.replay(&mut stage);
    }
    drop(stage);
    drop(waveform);

    if let Some(recorder) = recorder {
        log::info!("Finishing encoding...");
        recorder.finish()?;
        if let Some(output) = record {
            log::info!("Done! Output: {}", output.display());
        }
    }
    Ok(())
}

enum TempOrKept {
    Temp(tempfile::NamedTempFile),
    Kept(std::path::PathBuf),
}

impl TempOrKept {
    fn path(&self) -> &Path {
        match self {
            TempOrKept::Temp(file) => file.path(),
            TempOrKept::Kept(path) => path,
        }
    }
}

fn style_color(value: &str, fallback: render::canvas::Rgba) -> render::canvas::Rgba {
    parse_hex_color(value).unwrap_or_else(|| {
        log::warn!("Invalid color {:?}, using default", value);
        fallback
    })
}

fn captions(cli: &Cli) -> Result<Option<Captions>> {
    if cli.title.is_none() && !cli.show_time {
        return Ok(None);
    }
    let font_data = match cli.font_url {
        Some(ref url) => match load_font_from_url(url) {
            Ok(data) => Some(data),
            Err(err) => {
                log::warn!("Failed to load font from URL: {}", err);
                None
            }
        },
        None => None,
    };
    let font_size = (cli.height as f32 * 0.08).max(12.0);
    let overlay = TextOverlay::new(font_size, cli.font.as_deref(), font_data.as_deref())?;
    Ok(Some(Captions {
        overlay,
        title: cli.title.clone(),
        show_time: cli.show_time,
    }))
}
