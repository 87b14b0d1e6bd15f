//! Waterfall Player
//!
//! Plays any file as 8-bit PCM audio and a stream of raster frames.
//!
//! # Usage
//!
//! ```bash
//! waterfall-player path/to/file.bin
//! waterfall-player file.bin --profile frequency
//! waterfall-player file.bin --no-audio --capture-dir frames/
//! ```
//!
//! Controls are read from stdin one per line: key names (`space`, `up`,
//! `pageup`, `l`, `b` ...), `seek <byte>`, `seek+ <bytes>`, `volume <delta>`,
//! `loop <start> <end>`, `capture` or `quit`.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use waterfall_core::{ByteBuffer, PRESET_NAMES, Session};
use waterfall_player::input::spawn_stdin_reader;
use waterfall_player::{App, FrameCapture, ThreadedAudioOutput, config};

#[derive(Parser)]
#[command(name = "waterfall-player")]
#[command(author, version, about = "Binary waterfall - hear and see raw file bytes")]
struct Args {
    /// File to play
    file: PathBuf,

    /// Playback profile preset (waterfall, lane, big, frequency)
    #[arg(long, short = 'p')]
    profile: Option<String>,

    /// Config file (default: config.toml in the platform config directory)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip the audio device and run video-only
    #[arg(long)]
    no_audio: bool,

    /// Visual refresh cap in frames per second
    #[arg(long)]
    fps: Option<f64>,

    /// Directory for captured frames
    #[arg(long, value_name = "DIR")]
    capture_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut config = config::load(args.config.as_deref())?;
    if let Some(preset) = args.profile {
        config.profile.preset = preset;
    }
    if let Some(dir) = args.capture_dir {
        config.video.capture_dir = Some(dir);
    }
    if let Some(fps) = args.fps {
        config.video.fps_cap = fps;
    }

    let profile = config.profile.resolve().with_context(|| {
        format!(
            "Invalid playback profile (presets: {})",
            PRESET_NAMES.join(", ")
        )
    })?;

    let buffer = ByteBuffer::load(&args.file, profile.frame_bytes())
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let buffer = Arc::new(buffer);

    let mut session = Session::new(buffer.clone(), profile.clone(), config.audio.sample_rate)?;
    session.state_mut().set_volume(config.audio.initial_volume());

    let audio = if args.no_audio || !config.audio.enabled {
        ThreadedAudioOutput::video_only(session)
    } else {
        ThreadedAudioOutput::new(session)
    };

    let capture = config
        .video
        .capture_dir
        .as_ref()
        .map(|dir| {
            FrameCapture::new(dir, &args.file)
                .with_grid(config.video.capture_columns, config.video.capture_rows)
        });

    let (tx, rx) = mpsc::channel();
    // Detached: blocked on stdin until the process exits
    let _input = spawn_stdin_reader(config.bindings(), tx);

    let mut app = App::new(audio, buffer, profile, config.video.fps_cap, capture);
    let reason = app.run(&rx);
    tracing::info!("Playback ended ({:?})", reason);
    Ok(())
}
