//! Configuration management (`<config dir>/config.toml`)
//!
//! Every field has a default, so an empty or partial file is valid.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use waterfall_core::{MAX_VOLUME, Palette, PlaybackProfile, ProfileError};

use crate::input::{KeyAction, KeyBindings};

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Profile preset and geometry overrides
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Audio settings
    #[serde(default)]
    pub audio: AudioConfig,
    /// Render ticker and capture settings
    #[serde(default)]
    pub video: VideoConfig,
    /// Key name -> action overrides on top of the default bindings
    #[serde(default)]
    pub keys: BTreeMap<String, KeyAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Preset name (default: waterfall)
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default)]
    pub frame_width: Option<u32>,
    #[serde(default)]
    pub frame_height: Option<u32>,
    #[serde(default)]
    pub palette: Option<Palette>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Open an output device (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Initial volume (default: 1.0, range: 0.0-2.0)
    #[serde(default = "default_volume")]
    pub volume: f64,
    /// Rate used when no device is available (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Visual refresh cap in frames per second (default: 24)
    #[serde(default = "default_fps_cap")]
    pub fps_cap: f64,
    /// Where captured frames are written (default: none, capture disabled)
    #[serde(default)]
    pub capture_dir: Option<PathBuf>,
    /// Frames per row of a captured grid (default: 1)
    #[serde(default = "default_grid")]
    pub capture_columns: u32,
    /// Rows of a captured grid (default: 1)
    #[serde(default = "default_grid")]
    pub capture_rows: u32,
}

fn default_preset() -> String {
    "waterfall".to_string()
}
fn default_true() -> bool {
    true
}
fn default_volume() -> f64 {
    1.0
}
fn default_sample_rate() -> u32 {
    44_100
}
fn default_fps_cap() -> f64 {
    24.0
}
fn default_grid() -> u32 {
    1
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            frame_width: None,
            frame_height: None,
            palette: None,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            volume: default_volume(),
            sample_rate: default_sample_rate(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps_cap: default_fps_cap(),
            capture_dir: None,
            capture_columns: default_grid(),
            capture_rows: default_grid(),
        }
    }
}

impl ProfileConfig {
    /// Build the playback profile: preset plus overrides, validated
    pub fn resolve(&self) -> Result<PlaybackProfile, ProfileError> {
        let mut profile = PlaybackProfile::preset(&self.preset)?;
        if let Some(width) = self.frame_width {
            profile.frame_width = width;
        }
        if let Some(height) = self.frame_height {
            profile.frame_height = height;
        }
        if let Some(palette) = self.palette {
            profile.palette = palette;
        }
        profile.validate()?;
        Ok(profile)
    }
}

impl AudioConfig {
    /// Initial volume clamped to the playable range
    pub fn initial_volume(&self) -> f64 {
        if self.volume.is_nan() {
            default_volume()
        } else {
            self.volume.clamp(0.0, MAX_VOLUME)
        }
    }
}

impl Config {
    pub fn bindings(&self) -> KeyBindings {
        KeyBindings::with_overrides(&self.keys)
    }
}

/// Failure to read an explicitly requested config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/waterfall`
/// On macOS: `~/Library/Application Support/io.binary-waterfall.waterfall`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "binary-waterfall", "waterfall")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Read and parse one config file
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the configuration
///
/// An explicit path must exist and parse. Without one, `config.toml` in the
/// platform config directory is used; a missing file gives defaults and a
/// broken one is reported and ignored.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_from(path);
    }
    let Some(path) = config_dir().map(|dir| dir.join("config.toml")) else {
        return Ok(Config::default());
    };
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    match load_from(&path) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("{}. Using defaults.", e);
            Ok(Config::default())
        }
    }
}
