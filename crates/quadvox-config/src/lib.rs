//! Configuration for the quadvox synthesizer.
//!
//! Everything here lives outside the real-time path: preset files and banks,
//! the engine/output configuration, timed event scripts, and user directories.
//! All of it is TOML via serde, and every fallible operation returns
//! [`ConfigError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use quadvox_config::{PresetFile, Script, Sequencer};
//! use quadvox_core::{Controller, SynthShared};
//!
//! let preset = PresetFile::load("pad.toml")?.to_preset()?;
//!
//! let shared = SynthShared::new();
//! let mut control = Controller::new(&shared);
//! control.load_preset(&preset);
//!
//! let mut sequencer = Sequencer::from_script(&Script::demo())?;
//! sequencer.run_due(44_100, &mut control);
//! # Ok::<(), quadvox_config::ConfigError>(())
//! ```

mod bank;
mod engine_config;
mod error;
mod preset;

/// Platform paths for presets and configuration.
pub mod paths;

/// Timed event scripts and their playback.
pub mod script;

pub use bank::PresetBank;
pub use engine_config::{EngineConfig, OutputMode};
pub use error::ConfigError;
pub use paths::{find_preset, load_named_preset, user_config_dir, user_presets_dir};
pub use preset::{PresetFile, PresetParams};
pub use script::{Action, Command, MAX_SCRIPT_MS, Script, ScriptEvent, Sequencer, TimedCommand};
