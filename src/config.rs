//! Configuration file handling for action-recorder.
//!
//! Loads configuration from `<config dir>/action-recorder/config.toml` or a
//! custom path. Every field has a default, so a partial file is fine.

use crate::cancel::Hotkey;
use crate::capture::{CaptureSettings, ScrollMode};
use crate::event::KeySymbol;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Per-stream event cap
    pub max_events: usize,
    pub record_keyboard: bool,
    pub stop_key: String,
    pub pause_key: String,
    pub scroll_mode: ScrollMode,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_events: 50_000,
            record_keyboard: true,
            stop_key: "escape".to_string(),
            pause_key: "p".to_string(),
            scroll_mode: ScrollMode::Trackpad,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Reproduce recorded delays by default
    pub precision: bool,
    pub cancel_hotkey: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            precision: true,
            cancel_hotkey: "ctrl+s".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Recordings directory (default: platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the `[capture]` section into session settings.
    pub fn capture_settings(&self) -> Result<CaptureSettings, ConfigError> {
        let capture = &self.capture;
        if capture.max_events == 0 {
            return Err(invalid("capture.max_events", "0"));
        }
        Ok(CaptureSettings {
            max_events: capture.max_events,
            record_keyboard: capture.record_keyboard,
            scroll_mode: capture.scroll_mode,
            stop_key: parse_key("capture.stop_key", &capture.stop_key)?,
            pause_key: parse_key("capture.pause_key", &capture.pause_key)?,
        })
    }

    pub fn cancel_hotkey(&self) -> Result<Hotkey, ConfigError> {
        self.replay
            .cancel_hotkey
            .parse()
            .map_err(|_| invalid("replay.cancel_hotkey", &self.replay.cancel_hotkey))
    }

    pub fn recordings_dir(&self) -> Option<&Path> {
        self.storage.dir.as_deref()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn parse_key(key: &'static str, value: &str) -> Result<KeySymbol, ConfigError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        key: &'static str,
        value: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for '{}': '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("action-recorder").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/action-recorder/config.toml")
        })
}

/// Contents written by `config init`.
pub const DEFAULT_CONFIG: &str = r#"# action-recorder configuration

[capture]
# Maximum events kept per stream (mouse, keyboard)
max_events = 50000
# Record keyboard input alongside the mouse
record_keyboard = true
# Key that ends a recording
stop_key = "escape"
# Key that toggles pause
pause_key = "p"
# How scrolls replay: "trackpad" (Shift+Space, Down) or "wheel"
scroll_mode = "trackpad"

[replay]
# Reproduce recorded delays between events
precision = true
# Chord that cancels a running replay
cancel_hotkey = "ctrl+s"

[storage]
# Recordings directory (default: platform data dir)
# dir = "/path/to/recordings"
"#;
