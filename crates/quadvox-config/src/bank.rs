//! Preset banks: several presets in one TOML file.

use quadvox_core::FACTORY_PRESETS;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::preset::{PresetFile, write_toml_file};

/// An ordered collection of presets.
///
/// ```toml
/// [[presets]]
/// name = "Init Saw"
///
/// [[presets]]
/// name = "Soft Keys"
/// [presets.params]
/// filter_cutoff = 48
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresetBank {
    /// Presets in bank order.
    #[serde(default)]
    pub presets: Vec<PresetFile>,
}

impl PresetBank {
    /// The ten built-in presets, in recall order.
    pub fn factory() -> Self {
        Self {
            presets: FACTORY_PRESETS.iter().map(PresetFile::from_factory).collect(),
        }
    }

    /// First preset whose name matches `name`, ignoring ASCII case.
    pub fn find(&self, name: &str) -> Option<&PresetFile> {
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Number of presets.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether the bank holds no presets.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Check every preset converts to a valid engine preset.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.presets
            .iter()
            .try_for_each(|p| p.to_preset().map(|_| ()))
    }

    /// Load a bank from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a bank from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the bank to a TOML file, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_toml_file(path.as_ref(), &self.to_toml()?)
    }

    /// Serialize the bank to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
