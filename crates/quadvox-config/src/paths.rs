//! Platform paths for user presets and configuration.
//!
//! - **User config**: `~/.config/quadvox/` (Linux), `~/Library/Application Support/quadvox/` (macOS), `%APPDATA%\quadvox\` (Windows)
//! - **User presets**: the `presets/` subdirectory of the user config directory
//!
//! ```rust,no_run
//! use quadvox_config::paths;
//!
//! if let Some(path) = paths::find_preset("soft_keys") {
//!     println!("found {}", path.display());
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::bank::PresetBank;
use crate::error::ConfigError;
use crate::preset::PresetFile;

const APP_NAME: &str = "quadvox";
const PRESETS_SUBDIR: &str = "presets";
const PRESET_EXTENSION: &str = "toml";

/// User configuration directory, or `./quadvox` if the platform has none.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// User presets directory.
pub fn user_presets_dir() -> PathBuf {
    user_config_dir().join(PRESETS_SUBDIR)
}

/// Default engine configuration file.
pub fn default_engine_config_path() -> PathBuf {
    user_config_dir().join("engine.toml")
}

/// Create the user presets directory if needed and return it.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_presets_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
        tracing::debug!(path = %dir.display(), "created user presets directory");
    }
    Ok(dir)
}

/// Locate a preset file by path or name.
///
/// Tries `name` as a path, then `<user presets>/<name>.toml`.
pub fn find_preset(name: &str) -> Option<PathBuf> {
    find_preset_in(name, &user_presets_dir())
}

fn find_preset_in(name: &str, user_dir: &Path) -> Option<PathBuf> {
    let direct = PathBuf::from(name);
    if direct.is_file() {
        return Some(direct);
    }
    let file = if Path::new(name).extension().is_some() {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{name}.{PRESET_EXTENSION}"))
    };
    let candidate = user_dir.join(file);
    candidate.is_file().then_some(candidate)
}

/// Preset files in `dir`, sorted by path. A missing directory yields nothing.
pub fn list_presets_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut presets: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == PRESET_EXTENSION))
        .collect();
    presets.sort();
    presets
}

/// Preset files in the user presets directory.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in(&user_presets_dir())
}

/// Load a preset by file path, user preset name, or factory preset name.
///
/// Factory names match case-insensitively; so does a factory index such as `"5"`.
pub fn load_named_preset(name: &str) -> Result<PresetFile, ConfigError> {
    load_named_preset_in(name, &user_presets_dir())
}

fn load_named_preset_in(name: &str, user_dir: &Path) -> Result<PresetFile, ConfigError> {
    if let Some(path) = find_preset_in(name, user_dir) {
        return PresetFile::load(path);
    }
    let bank = PresetBank::factory();
    if let Ok(index) = name.parse::<usize>()
        && let Some(preset) = bank.presets.get(index)
    {
        return Ok(preset.clone());
    }
    bank.find(name)
        .cloned()
        .ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))
}
