//! Run-scoped configuration.
//!
//! All configuration is read once at the start of a run and passed down
//! explicitly; nothing is global and nothing mutates mid-run. Two optional
//! files feed it: `config.json` for the announcement threshold and
//! announcer overrides, and `stops.txt` for the stop list, one id per
//! line. Missing files mean defaults; malformed files are operator errors
//! and abort the run, unlike bad upstream data which is merely skipped.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::{Interval, StopId};

/// Default announcement threshold in minutes.
const DEFAULT_INTERVAL: i64 = 5;

/// Default stop list when no stops file exists.
const DEFAULT_STOPS: [&str; 3] = ["71", "72", "73"];

/// Default voice clip directory.
const DEFAULT_VOICE_DIR: &str = "voice";

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading a config file failed for a reason other than absence
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file present but not valid JSON of the expected shape
    #[error("malformed config {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// A stop id in the stops file is unusable
    #[error("bad stop id in {path}: {message}")]
    BadStopId { path: PathBuf, message: String },
}

/// `config.json` document. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    /// Announcement threshold in minutes
    interval: Option<i64>,
    /// Voice clip directory
    voice_dir: Option<PathBuf>,
    /// Command used to play a clip (receives the file path as its argument)
    player_command: Option<String>,
    /// Command used to speak text (receives the text as its argument)
    speaker_command: Option<String>,
}

/// Everything one run needs to know.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Announcement threshold: a trip is announced when its countdown
    /// crosses from above this to at-or-below it
    pub threshold: Interval,
    /// Stops to poll, in announcement order
    pub stops: Vec<StopId>,
    /// Directory holding pre-recorded voice clips
    pub voice_dir: PathBuf,
    /// External command for clip playback
    pub player_command: String,
    /// External command for text-to-speech
    pub speaker_command: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threshold: Interval::from_minutes(DEFAULT_INTERVAL),
            stops: DEFAULT_STOPS
                .iter()
                .map(|s| StopId::new(s.to_string()).expect("default stop ids are non-blank"))
                .collect(),
            voice_dir: PathBuf::from(DEFAULT_VOICE_DIR),
            player_command: default_player(),
            speaker_command: default_speaker(),
        }
    }
}

impl RunConfig {
    /// Build a run configuration from the two optional files.
    ///
    /// A missing file contributes defaults. A present-but-malformed file
    /// is an error: a scheduler silently running with the wrong threshold
    /// is worse than one that fails loudly.
    pub fn load(config_path: &Path, stops_path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(text) = read_optional(config_path)? {
            let file: ConfigFile =
                serde_json::from_str(&text).map_err(|e| ConfigError::Malformed {
                    path: config_path.to_path_buf(),
                    message: e.to_string(),
                })?;
            if let Some(interval) = file.interval {
                config.threshold = Interval::from_minutes(interval);
            }
            if let Some(dir) = file.voice_dir {
                config.voice_dir = dir;
            }
            if let Some(cmd) = file.player_command {
                config.player_command = cmd;
            }
            if let Some(cmd) = file.speaker_command {
                config.speaker_command = cmd;
            }
        }

        if let Some(text) = read_optional(stops_path)? {
            config.stops = parse_stops(&text, stops_path)?;
        }

        Ok(config)
    }
}

/// Parse the stops file: one id per line, trimmed, blank lines skipped.
fn parse_stops(text: &str, path: &Path) -> Result<Vec<StopId>, ConfigError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            StopId::new(line.to_string()).map_err(|e| ConfigError::BadStopId {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })
        .collect()
}

fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(target_os = "macos")]
fn default_player() -> String {
    "afplay".to_string()
}

#[cfg(not(target_os = "macos"))]
fn default_player() -> String {
    "aplay".to_string()
}

#[cfg(target_os = "macos")]
fn default_speaker() -> String {
    "say".to_string()
}

#[cfg(not(target_os = "macos"))]
fn default_speaker() -> String {
    "espeak".to_string()
}
