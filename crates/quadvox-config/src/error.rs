//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, validating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Preset not found
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// Parameter name not recognized
    #[error("unknown synth parameter: {0}")]
    UnknownParameter(String),

    /// Parameter value outside its range
    #[error("invalid value {value} for '{param}': expected {min}..={max}")]
    InvalidParameter {
        /// snake_case parameter name.
        param: String,
        /// Rejected value.
        value: i64,
        /// Smallest accepted value.
        min: i8,
        /// Largest accepted value.
        max: i8,
    },

    /// Engine configuration or script field with an unusable value
    #[error("invalid config '{field}': {reason}")]
    InvalidConfig {
        /// Field name.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Malformed event script
    #[error("invalid script event #{index}: {reason}")]
    InvalidScript {
        /// Zero-based index of the offending event.
        index: usize,
        /// Description of the problem.
        reason: String,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Create an out-of-range parameter error.
    pub fn invalid_parameter(param: quadvox_core::Param, value: impl Into<i64>) -> Self {
        ConfigError::InvalidParameter {
            param: param.name().to_string(),
            value: value.into(),
            min: param.min(),
            max: param.max(),
        }
    }

    /// Create a script error for event `index`.
    pub fn invalid_script(index: usize, reason: impl Into<String>) -> Self {
        ConfigError::InvalidScript {
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadvox_core::Param;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    #[test]
    fn read_file_factory_keeps_path_and_source() {
        let err = ConfigError::read_file("/some/path", mock_io_err());
        assert!(matches!(
            err,
            ConfigError::ReadFile { ref path, .. } if path == std::path::Path::new("/some/path")
        ));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/some/path"));
    }

    #[test]
    fn write_and_create_dir_factories() {
        let err = ConfigError::write_file("/out", mock_io_err());
        assert!(matches!(err, ConfigError::WriteFile { .. }));
        let err = ConfigError::create_dir("/dir", mock_io_err());
        assert!(err.to_string().starts_with("failed to create directory"));
    }

    #[test]
    fn invalid_parameter_reports_range() {
        let err = ConfigError::invalid_parameter(Param::FilterResonance, 9);
        assert_eq!(
            err.to_string(),
            "invalid value 9 for 'filter_resonance': expected 0..=5"
        );
    }

    #[test]
    fn invalid_script_reports_index() {
        let err = ConfigError::invalid_script(3, "events out of order");
        assert_eq!(err.to_string(), "invalid script event #3: events out of order");
        assert!(err.source().is_none());
    }
}
