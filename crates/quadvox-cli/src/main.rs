//! quadvox - command-line front end for the quadvox synthesizer.

mod audio;
mod commands;
mod render;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quadvox")]
#[command(author, version, about = "Four-voice fixed-point synthesizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a script to a WAV file
    Render(commands::render::RenderArgs),

    /// Play a script through an audio device
    Play(commands::play::PlayArgs),

    /// List, show and export presets
    Presets(commands::presets::PresetsArgs),

    /// Run a script offline and print the status report
    Status(commands::status::StatusArgs),
}

/// Install the stderr subscriber, then route `log` records into it.
fn init_logging() -> Result<(), tracing_log::log::SetLoggerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    tracing_log::LogTracer::init()
}

fn main() -> anyhow::Result<()> {
    if let Err(err) = init_logging() {
        tracing::warn!(error = %err, "log records from dependencies will be dropped");
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Play(args) => commands::play::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Status(args) => commands::status::run(args),
    }
}
