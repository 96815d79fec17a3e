//! Real-time playback of a script.
//!
//! The audio callback owns the engine; this thread plays the control context,
//! running script commands as wall-clock time reaches them.

use super::common::SynthArgs;
use crate::audio::{StreamRenderer, output_device_names, start_output};
use clap::Args;
use quadvox_config::Sequencer;
use quadvox_config::script::ms_to_samples;
use quadvox_core::{Controller, Engine, SynthShared, Tables};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared state of the live synth. Const-constructed, like firmware statics.
static SHARED: SynthShared = SynthShared::new();

const CONTROL_POLL: Duration = Duration::from_millis(2);
const RELEASE_TAIL: Duration = Duration::from_millis(300);

#[derive(Args, Debug)]
pub struct PlayArgs {
    #[command(flatten)]
    synth: SynthArgs,

    /// Output device (partial name match)
    #[arg(short, long)]
    device: Option<String>,

    /// List output devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Print the status report every N seconds
    #[arg(long, value_name = "SECONDS")]
    status_every: Option<u64>,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    if args.list_devices {
        println!("Output devices:");
        for name in output_device_names()? {
            println!("  {name}");
        }
        return Ok(());
    }

    let config = args.synth.engine_config()?;
    let script = args.synth.script()?;
    let mut sequencer = Sequencer::from_script(&script)?;

    let mut control = Controller::new(&SHARED);
    args.synth.apply_preset(&mut control)?;

    let renderer = StreamRenderer::new(Engine::new(&SHARED, Tables::shared()), &config);
    let stream = start_output(renderer, args.device.as_deref(), 2)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let total = Duration::from_millis(script.duration_ms());
    println!(
        "Playing {:.1}s in {} mode... Press Ctrl+C to stop.",
        total.as_secs_f64(),
        config.mode
    );

    let status_every = args.status_every.map(Duration::from_secs);
    let start = Instant::now();
    let mut last_status = start;
    while running.load(Ordering::SeqCst) {
        let elapsed = start.elapsed();
        if elapsed >= total {
            break;
        }
        let now = ms_to_samples(elapsed.as_millis() as u64);
        let ran = sequencer.run_due(now, &mut control);
        if ran > 0 {
            tracing::debug!(ran, at_sample = now, "script commands applied");
        }
        if let Some(every) = status_every
            && last_status.elapsed() >= every
        {
            println!("{}", control.status());
            last_status = Instant::now();
        }
        std::thread::sleep(CONTROL_POLL);
    }

    control.all_notes_off();
    std::thread::sleep(RELEASE_TAIL);
    drop(stream);

    if !running.load(Ordering::SeqCst) {
        println!("\nStopped.");
    }
    print!("{}", control.status());
    Ok(())
}
