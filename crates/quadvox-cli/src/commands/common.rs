//! Helpers shared by the commands.

use anyhow::Context;
use quadvox_config::paths::default_engine_config_path;
use quadvox_config::{EngineConfig, OutputMode, Script, load_named_preset};
use quadvox_core::Controller;
use std::path::{Path, PathBuf};

/// Options every synth-running command accepts.
#[derive(clap::Args, Debug, Clone)]
pub struct SynthArgs {
    /// Event script (TOML); the built-in demo when omitted
    #[arg(short, long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Preset applied before the script starts (path, user preset, factory name or index)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Engine configuration file; defaults to the user config directory
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output mode, overriding the configuration file
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<OutputMode>,

    /// Length in milliseconds, overriding the script
    #[arg(long)]
    pub duration_ms: Option<u64>,
}

fn parse_mode(s: &str) -> Result<OutputMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "pwm" => Ok(OutputMode::Pwm),
        "i2s" => Ok(OutputMode::I2s),
        other => Err(format!("unknown output mode '{other}' (expected pwm or i2s)")),
    }
}

impl SynthArgs {
    /// Engine configuration: explicit file, else the user file if present, else defaults.
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => {
                let path = default_engine_config_path();
                if path.is_file() {
                    load_config(&path)?
                } else {
                    EngineConfig::default()
                }
            }
        };
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        Ok(config)
    }

    /// The script to play.
    pub fn script(&self) -> anyhow::Result<Script> {
        let mut script = match &self.script {
            Some(path) => Script::load(path)
                .with_context(|| format!("loading script {}", path.display()))?,
            None => Script::demo(),
        };
        if let Some(ms) = self.duration_ms {
            script.duration_ms = Some(ms);
            script.validate().context("--duration-ms")?;
        }
        Ok(script)
    }

    /// Apply `--preset`, if given.
    pub fn apply_preset(&self, control: &mut Controller<'_>) -> anyhow::Result<()> {
        let Some(name) = &self.preset else {
            return Ok(());
        };
        let file = load_named_preset(name)?;
        let preset = file
            .to_preset()
            .with_context(|| format!("preset '{}'", file.name))?;
        control.load_preset(&preset);
        tracing::info!(preset = %file.name, "preset applied");
        Ok(())
    }
}

fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let config = EngineConfig::load(path)
        .with_context(|| format!("loading engine config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "engine config loaded");
    Ok(config)
}
