//! Preset file format and operations.

use quadvox_core::{FactoryPreset, Param, Preset};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// A named synth preset as stored on disk.
///
/// # TOML Format
///
/// ```toml
/// name = "Soft Keys"
/// description = "Mellow detuned pad"
///
/// [params]
/// osc2_coarse_pitch = 12
/// osc2_fine_pitch = 2
/// filter_cutoff = 48
/// filter_resonance = 2
/// ```
///
/// Parameters left out of `[params]` take the engine defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresetFile {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameter values.
    #[serde(default)]
    pub params: PresetParams,
}

/// The `[params]` table of a preset file.
///
/// Values are held wider than the engine's `i8` so out-of-range entries are
/// reported with the value the file actually contains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct PresetParams {
    pub octave_shift: i64,
    pub osc_waveform: i64,
    pub osc2_coarse_pitch: i64,
    pub osc2_fine_pitch: i64,
    pub osc_mix: i64,
    pub filter_cutoff: i64,
    pub filter_resonance: i64,
    pub filter_mod_amount: i64,
    pub eg_decay_time: i64,
    pub eg_sustain_level: i64,
    pub lfo_depth: i64,
    pub lfo_rate: i64,
}

impl Default for PresetParams {
    fn default() -> Self {
        Self::from(Preset::DEFAULT)
    }
}

impl From<Preset> for PresetParams {
    fn from(p: Preset) -> Self {
        Self {
            octave_shift: p.octave_shift.into(),
            osc_waveform: p.osc_waveform.into(),
            osc2_coarse_pitch: p.osc2_coarse_pitch.into(),
            osc2_fine_pitch: p.osc2_fine_pitch.into(),
            osc_mix: p.osc_mix.into(),
            filter_cutoff: p.filter_cutoff.into(),
            filter_resonance: p.filter_resonance.into(),
            filter_mod_amount: p.filter_mod_amount.into(),
            eg_decay_time: p.eg_decay_time.into(),
            eg_sustain_level: p.eg_sustain_level.into(),
            lfo_depth: p.lfo_depth.into(),
            lfo_rate: p.lfo_rate.into(),
        }
    }
}

impl PresetParams {
    /// Raw value for `param`.
    pub fn get(&self, param: Param) -> i64 {
        match param {
            Param::OctaveShift => self.octave_shift,
            Param::OscWaveform => self.osc_waveform,
            Param::Osc2CoarsePitch => self.osc2_coarse_pitch,
            Param::Osc2FinePitch => self.osc2_fine_pitch,
            Param::OscMix => self.osc_mix,
            Param::EgSustainLevel => self.eg_sustain_level,
            Param::EgDecayTime => self.eg_decay_time,
            Param::FilterCutoff => self.filter_cutoff,
            Param::FilterResonance => self.filter_resonance,
            Param::FilterModAmount => self.filter_mod_amount,
            Param::LfoDepth => self.lfo_depth,
            Param::LfoRate => self.lfo_rate,
        }
    }

    /// Validate every field and convert to an engine preset.
    ///
    /// Fails on the first field, in parameter id order, outside its range.
    pub fn to_preset(&self) -> Result<Preset, ConfigError> {
        let mut preset = Preset::DEFAULT;
        for param in Param::ALL {
            let raw = self.get(param);
            let value = i8::try_from(raw)
                .ok()
                .filter(|&v| param.contains(v))
                .ok_or_else(|| ConfigError::invalid_parameter(param, raw))?;
            preset.set(param, value);
        }
        Ok(preset)
    }
}

impl PresetFile {
    /// Create a preset file with default parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: PresetParams::default(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the parameter values.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.params = preset.into();
        self
    }

    /// Preset file for a factory preset.
    pub fn from_factory(factory: &FactoryPreset) -> Self {
        Self::new(factory.name).with_preset(factory.preset)
    }

    /// Validated engine preset.
    pub fn to_preset(&self) -> Result<Preset, ConfigError> {
        self.params.to_preset()
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_toml_file(path.as_ref(), &self.to_toml()?)
    }

    /// Serialize the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Write `content` to `path`, creating missing parent directories.
pub(crate) fn write_toml_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadvox_core::FACTORY_PRESETS;
    use tempfile::TempDir;

    #[test]
    fn test_missing_params_take_defaults() {
        let file = PresetFile::from_toml("name = \"Bare\"").unwrap();
        assert_eq!(file.to_preset().unwrap(), Preset::DEFAULT);
        assert!(file.description.is_none());
    }

    #[test]
    fn test_partial_params() {
        let toml = r#"
            name = "Bright"
            [params]
            filter_cutoff = 110
            octave_shift = -2
        "#;
        let preset = PresetFile::from_toml(toml).unwrap().to_preset().unwrap();
        assert_eq!(preset.filter_cutoff, 110);
        assert_eq!(preset.octave_shift, -2);
        assert_eq!(preset.lfo_rate, Preset::DEFAULT.lfo_rate);
    }

    #[test]
    fn test_out_of_range_reports_first_field() {
        let toml = r#"
            name = "Broken"
            [params]
            filter_resonance = 7
            lfo_rate = 300
        "#;
        let err = PresetFile::from_toml(toml).unwrap().to_preset().unwrap_err();
        match err {
            ConfigError::InvalidParameter {
                param, value, max, ..
            } => {
                assert_eq!(param, "filter_resonance");
                assert_eq!(value, 7);
                assert_eq!(max, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_value_wider_than_i8_is_reported_verbatim() {
        let params = PresetParams {
            lfo_rate: 300,
            ..PresetParams::default()
        };
        let err = params.to_preset().unwrap_err();
        assert!(err.to_string().contains("300"), "{err}");
    }

    #[test]
    fn test_unknown_param_rejected() {
        let toml = r#"
            name = "Typo"
            [params]
            filter_cutof = 10
        "#;
        assert!(matches!(
            PresetFile::from_toml(toml),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_factory_presets_convert_back() {
        for factory in &FACTORY_PRESETS {
            let file = PresetFile::from_factory(factory);
            assert_eq!(file.name, factory.name);
            assert_eq!(file.to_preset().unwrap(), factory.preset);
        }
    }

    #[test]
    fn test_save_creates_parent_and_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("keys.toml");
        let file = PresetFile::from_factory(&FACTORY_PRESETS[5]).with_description("from bank");
        file.save(&path).unwrap();
        assert!(path.exists());
        assert_eq!(PresetFile::load(&path).unwrap(), file);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PresetFile::load("/nonexistent/quadvox/preset.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
