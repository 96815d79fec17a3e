//! Engine and output configuration.

use quadvox_core::SAMPLE_RATE;
use quadvox_core::output::{DEFAULT_SYS_CLOCK_HZ, pwm_cycle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::ConfigError;
use crate::preset::write_toml_file;

/// How finished samples leave the engine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// One tick per PWM wrap, mapped to a duty-cycle level.
    #[default]
    Pwm,
    /// Interleaved stereo `i16` buffers serviced by a timer.
    I2s,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputMode::Pwm => "pwm",
            OutputMode::I2s => "i2s",
        })
    }
}

/// Engine configuration file.
///
/// ```toml
/// mode = "i2s"
/// buffer_frames = 441
/// sys_clock_hz = 120000000
/// channels = 2
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Output path.
    pub mode: OutputMode,
    /// Frames per I2S buffer.
    pub buffer_frames: usize,
    /// System clock, used to derive the PWM wrap value.
    pub sys_clock_hz: u32,
    /// Channels written to WAV output (1 or 2).
    pub channels: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            buffer_frames: 441,
            sys_clock_hz: DEFAULT_SYS_CLOCK_HZ,
            channels: 2,
        }
    }
}

impl EngineConfig {
    /// PWM wrap value for the configured clock.
    pub fn pwm_cycle(&self) -> u32 {
        pwm_cycle(self.sys_clock_hz)
    }

    /// Interleaved `i16` samples per I2S buffer.
    pub fn buffer_len(&self) -> usize {
        self.buffer_frames * 2
    }

    /// Check field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_frames == 0 {
            return Err(invalid("buffer_frames", "must be at least 1"));
        }
        if self.sys_clock_hz < 2 * SAMPLE_RATE {
            return Err(invalid(
                "sys_clock_hz",
                format!("must be at least {} Hz", 2 * SAMPLE_RATE),
            ));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(invalid(
                "channels",
                format!("expected 1 or 2, got {}", self.channels),
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_toml_file(path.as_ref(), &self.to_toml()?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}
