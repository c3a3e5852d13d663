//! Application configuration.
//!
//! Settings are read from `~/.countdown/config.json` when it exists.
//! Every field has a default, so a partial file (or none at all) is fine.
//!
//! ```json
//! {
//!   "default_duration_minutes": 25,
//!   "sound": {
//!     "enabled": true,
//!     "alarm": { "file": "/path/to/alarm.wav", "volume": 0.8 }
//!   }
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::sound::{
    Cue, CueSet, SoundSource, DEFAULT_ALARM_VOLUME, DEFAULT_FINAL_BEEP_VOLUME,
    DEFAULT_TICK_VOLUME,
};
use crate::types::{CueChannel, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};

/// Directory under the home directory holding all countdown files.
pub const DATA_DIR_NAME: &str = ".countdown";

/// Config file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Socket file name inside the data directory.
pub const SOCKET_FILE_NAME: &str = "countdown.sock";

/// Task file name inside the data directory.
pub const TASKS_FILE_NAME: &str = "tasks.json";

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The home directory could not be determined.
    #[error("ホームディレクトリが見つかりません")]
    HomeDirectoryNotFound,

    /// The config file could not be read.
    #[error("設定ファイル '{path}' を読み込めません: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON.
    #[error("設定ファイル '{path}' の形式が不正です: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A setting is out of range.
    #[error("設定値が不正です: {0}")]
    Invalid(String),
}

/// Returns `~/.countdown`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(DATA_DIR_NAME))
        .ok_or(ConfigError::HomeDirectoryNotFound)
}

/// Returns `~/.countdown/config.json`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join(CONFIG_FILE_NAME))
}

/// Returns `~/.countdown/countdown.sock`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_socket_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join(SOCKET_FILE_NAME))
}

fn default_duration_minutes() -> u32 {
    25
}

fn default_true() -> bool {
    true
}

fn default_tick_cue() -> CueConfig {
    CueConfig::with_volume(DEFAULT_TICK_VOLUME)
}

fn default_final_beep_cue() -> CueConfig {
    CueConfig::with_volume(DEFAULT_FINAL_BEEP_VOLUME)
}

fn default_alarm_cue() -> CueConfig {
    CueConfig::with_volume(DEFAULT_ALARM_VOLUME)
}

/// Sound and volume of one cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueConfig {
    /// Audio file to play instead of the built-in tone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Playback volume in `0.0..=1.0`.
    pub volume: f32,
}

impl CueConfig {
    fn with_volume(volume: f32) -> Self {
        Self { file: None, volume }
    }

    /// Resolves the cue, falling back to the built-in tone when the
    /// configured file is unusable.
    fn to_cue(&self, channel: CueChannel) -> Cue {
        let source = match &self.file {
            Some(path) => SoundSource::from_path(path).unwrap_or_else(|e| {
                warn!(
                    "Cannot use {} sound '{}': {}, using built-in tone",
                    channel.as_str(),
                    path.display(),
                    e
                );
                SoundSource::embedded(channel.as_str())
            }),
            None => SoundSource::embedded(channel.as_str()),
        };
        Cue::new(source, self.volume)
    }
}

/// Audio cue settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Whether cues are played at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_tick_cue")]
    pub tick: CueConfig,

    #[serde(default = "default_final_beep_cue")]
    pub final_beep: CueConfig,

    #[serde(default = "default_alarm_cue")]
    pub alarm: CueConfig,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick: default_tick_cue(),
            final_beep: default_final_beep_cue(),
            alarm: default_alarm_cue(),
        }
    }
}

impl SoundConfig {
    /// Returns the settings of one cue channel.
    #[must_use]
    pub fn cue(&self, channel: CueChannel) -> &CueConfig {
        match channel {
            CueChannel::Tick => &self.tick,
            CueChannel::FinalBeep => &self.final_beep,
            CueChannel::Alarm => &self.alarm,
        }
    }

    /// Builds the cue set used by the engine.
    #[must_use]
    pub fn cue_set(&self) -> CueSet {
        CueSet {
            tick: self.tick.to_cue(CueChannel::Tick),
            final_beep: self.final_beep.to_cue(CueChannel::FinalBeep),
            alarm: self.alarm.to_cue(CueChannel::Alarm),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Countdown duration used when no task is active.
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,

    /// Overrides `~/.countdown/countdown.sock`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,

    /// Overrides `~/.countdown/tasks.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_path: Option<PathBuf>,

    #[serde(default)]
    pub sound: SoundConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: default_duration_minutes(),
            socket_path: None,
            tasks_path: None,
            sound: SoundConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads and validates the config file. A missing file yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Config file {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `~/.countdown/config.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(&default_config_path()?)
    }

    /// Checks that every setting is in range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES)
            .contains(&self.default_duration_minutes)
        {
            return Err(ConfigError::Invalid(format!(
                "default_duration_minutes は{}-{}の範囲で指定してください",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
            )));
        }

        for channel in CueChannel::ALL {
            let volume = self.sound.cue(channel).volume;
            if !(0.0..=1.0).contains(&volume) {
                return Err(ConfigError::Invalid(format!(
                    "sound.{}.volume は0.0-1.0の範囲で指定してください",
                    channel.as_str()
                )));
            }
        }

        Ok(())
    }

    /// Returns the socket path, configured or default.
    ///
    /// # Errors
    ///
    /// Returns an error if the default path cannot be determined.
    pub fn socket_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.socket_path {
            Some(path) => Ok(path.clone()),
            None => default_socket_path(),
        }
    }

    /// Returns the task file path, configured or default.
    ///
    /// # Errors
    ///
    /// Returns an error if the default path cannot be determined.
    pub fn tasks_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.tasks_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(TASKS_FILE_NAME)),
        }
    }
}
