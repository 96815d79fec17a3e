//! Run a script offline and print the resulting status report.

use super::common::SynthArgs;
use clap::Args;
use quadvox_config::Sequencer;
use quadvox_core::{Controller, SynthShared};

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    synth: SynthArgs,

    /// Only apply the script's events; do not run the engine
    #[arg(long)]
    no_render: bool,
}

pub fn run(args: StatusArgs) -> anyhow::Result<()> {
    let script = args.synth.script()?;
    let mut sequencer = Sequencer::from_script(&script)?;

    let shared = SynthShared::new();
    let mut control = Controller::new(&shared);
    args.synth.apply_preset(&mut control)?;

    if args.no_render {
        sequencer.run_due(u64::MAX, &mut control);
    } else {
        let config = args.synth.engine_config()?;
        crate::render::render(&mut control, &mut sequencer, &config, script.duration_samples());
    }
    print!("{}", control.status());
    Ok(())
}
