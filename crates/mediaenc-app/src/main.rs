//! mediaenc - encode a test pattern or tone with a stored preset
//!
//! Usage: mediaenc <output> [--preset NAME] [--frames N] [--settings PATH] [--dry-run]

use anyhow::{anyhow, bail, Context, Result};
use mediaenc_core::{FrameBuffer, MediaTime};
use mediaenc_encoder::{
    EncoderFactory, EncoderPreset, EncoderSession, EncoderSettings, FfmpegFactory, MemoryEncoder,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str =
    "usage: mediaenc <output> [--preset NAME] [--frames N] [--settings PATH] [--dry-run]";

/// Sample frames per audio block.
const AUDIO_BLOCK: usize = 1024;

#[derive(Debug, PartialEq)]
struct Options {
    output: PathBuf,
    preset: Option<String>,
    frames: u64,
    settings: Option<PathBuf>,
    dry_run: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options> {
    let mut output = None;
    let mut preset = None;
    let mut frames: u64 = 120;
    let mut settings = None;
    let mut dry_run = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--preset" => preset = Some(args.next().context("--preset needs a name")?),
            "--frames" => {
                let value = args.next().context("--frames needs a count")?;
                frames = value
                    .parse::<u64>()
                    .with_context(|| format!("invalid frame count: {value}"))?;
            }
            "--settings" => {
                settings = Some(PathBuf::from(
                    args.next().context("--settings needs a path")?,
                ))
            }
            "--dry-run" => dry_run = true,
            flag if flag.starts_with("--") => bail!("unknown flag: {flag}"),
            path if output.is_none() => output = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument: {extra}"),
        }
    }

    Ok(Options {
        output: output.ok_or_else(|| anyhow!(USAGE))?,
        preset,
        frames,
        settings,
        dry_run,
    })
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = parse_args(std::env::args().skip(1))?;

    let settings_path = options
        .settings
        .clone()
        .unwrap_or_else(EncoderSettings::default_path);
    let settings = EncoderSettings::load(&settings_path)?;

    let name = options
        .preset
        .clone()
        .unwrap_or_else(|| settings.default_preset.clone());
    let preset = settings
        .preset(&name)
        .ok_or_else(|| anyhow!("no preset named {name:?} in {}", settings_path.display()))?;
    info!(preset = %name, output = %options.output.display(), "Encoding");

    if options.dry_run {
        let encoder = MemoryEncoder::new();
        render(&encoder, &options, preset)?;
        info!(frames = encoder.frame_count(), "Dry run finished");
    } else {
        render(&FfmpegFactory::locate()?, &options, preset)?;
    }

    Ok(())
}

/// Render the preset's video track if it has one, otherwise its first
/// audio track.
fn render<F: EncoderFactory>(
    factory: &F,
    options: &Options,
    preset: &EncoderPreset,
) -> Result<()> {
    if let Some(video) = preset.video {
        let (width, height) = video.dimensions();
        let frame = FrameBuffer::test_pattern(width, height);
        let mut session = EncoderSession::create_video(factory, &options.output, video)?;

        for i in 0..options.frames {
            let timestamp = MediaTime::new(i as i64, video.frame_rate())?;
            if !session.append_frame(&frame, Some(timestamp))? {
                bail!("encoder rejected frame {i}");
            }
        }
        session.dispose();
    } else if let Some(track) = preset.audio.first() {
        let channels = track.channel_count as usize;
        let sample_rate = track.sample_rate.to_f64();
        let mut session =
            EncoderSession::create_audio(factory, &options.output, vec![track.clone()])?;

        let mut block = vec![0.0f32; AUDIO_BLOCK * channels];
        for b in 0..options.frames {
            for (n, frame) in block.chunks_exact_mut(channels.max(1)).enumerate() {
                let t = (b as usize * AUDIO_BLOCK + n) as f64 / sample_rate;
                let sample = (0.2 * (2.0 * std::f64::consts::PI * 440.0 * t).sin()) as f32;
                frame.fill(sample);
            }
            if !session.append_samples(0, &block)? {
                bail!("encoder rejected audio block {b}");
            }
        }
        session.dispose();
    } else {
        bail!("preset has no tracks");
    }
    Ok(())
}
