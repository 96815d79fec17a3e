//! Render a script to a WAV file.

use super::common::SynthArgs;
use anyhow::Context;
use clap::Args;
use quadvox_config::Sequencer;
use quadvox_core::{Controller, SAMPLE_RATE, SynthShared};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    synth: SynthArgs,

    /// Output WAV file
    #[arg(short, long, default_value = "quadvox.wav")]
    output: PathBuf,

    /// Channels to write (1 or 2), overriding the configuration file
    #[arg(long)]
    channels: Option<u16>,

    /// Print the status report after rendering
    #[arg(long)]
    status: bool,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = args.synth.engine_config()?;
    if let Some(channels) = args.channels {
        config.channels = channels;
        config.validate()?;
    }
    let script = args.synth.script()?;
    let mut sequencer = Sequencer::from_script(&script)?;

    let shared = SynthShared::new();
    let mut control = Controller::new(&shared);
    args.synth.apply_preset(&mut control)?;

    let total = script.duration_samples();
    let samples = crate::render::render(&mut control, &mut sequencer, &config, total);

    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&args.output, spec)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for &sample in &samples {
        for _ in 0..config.channels {
            writer.write_sample(sample)?;
        }
    }
    writer.finalize()?;

    let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
    tracing::info!(
        path = %args.output.display(),
        frames = samples.len(),
        sample_rate = SAMPLE_RATE,
        mode = %config.mode,
        peak,
        "render complete"
    );
    println!(
        "Wrote {} ({} frames, {:.2}s, {} mode, peak {})",
        args.output.display(),
        samples.len(),
        samples.len() as f64 / f64::from(SAMPLE_RATE),
        config.mode,
        peak
    );
    if args.status {
        print!("{}", control.status());
    }
    Ok(())
}
