// Session configuration - read once at transport start
//
// Stored as RON (or JSON when the file ends in `.json`). The timing core
// trusts a validated config; all range checks live here.

use crate::sequencer::timeline::{Subdivision, TempoIncrement, TimeSignature, Tempo};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Bars per progression cycle
pub const BARS_PER_CYCLE: u32 = 4;

/// Intervals (seconds) offered by the time-based policy
pub const SUPPORTED_INTERVALS_SECS: [u32; 8] = [10, 15, 30, 45, 60, 90, 120, 300];

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// When the tempo goes up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressionSettings {
    /// Every `bars_per_cycle` bars
    Bars { bars_per_cycle: u32 },
    /// Every `interval_secs` seconds of active play, on the next cycle start
    Timed { interval_secs: u32 },
}

impl ProgressionSettings {
    /// Cycle length used to align bumps, for both policies
    pub fn bars_per_cycle(&self) -> u32 {
        match self {
            ProgressionSettings::Bars { bars_per_cycle } => *bars_per_cycle,
            ProgressionSettings::Timed { .. } => BARS_PER_CYCLE,
        }
    }
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        ProgressionSettings::Bars {
            bars_per_cycle: BARS_PER_CYCLE,
        }
    }
}

/// Everything the timing core needs for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub start_bpm: u16,
    pub increment: TempoIncrement,
    pub time_signature: TimeSignature,
    pub subdivision: Subdivision,
    pub progression: ProgressionSettings,
    /// Visual units swept per beat cycle (renderer constant)
    pub units_per_cycle: f64,
    pub click_volume: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start_bpm: 60,
            increment: TempoIncrement::default(),
            time_signature: TimeSignature::default(),
            subdivision: Subdivision::default(),
            progression: ProgressionSettings::default(),
            units_per_cycle: 400.0,
            click_volume: 0.5,
        }
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

impl SessionConfig {
    /// Check every field against its enumerated domain
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(Tempo::MIN_BPM..=Tempo::MAX_BPM).contains(&self.start_bpm) {
            return Err(ConfigError::Invalid(format!(
                "start BPM {} outside {}..={}",
                self.start_bpm,
                Tempo::MIN_BPM,
                Tempo::MAX_BPM
            )));
        }

        if !self.time_signature.is_supported() {
            return Err(ConfigError::Invalid(format!(
                "unsupported time signature {}",
                self.time_signature
            )));
        }

        match self.progression {
            ProgressionSettings::Bars { bars_per_cycle } if bars_per_cycle != BARS_PER_CYCLE => {
                return Err(ConfigError::Invalid(format!(
                    "bars per cycle must be {BARS_PER_CYCLE}, got {bars_per_cycle}"
                )));
            }
            ProgressionSettings::Timed { interval_secs }
                if !SUPPORTED_INTERVALS_SECS.contains(&interval_secs) =>
            {
                return Err(ConfigError::Invalid(format!(
                    "unsupported progression interval {interval_secs}s"
                )));
            }
            _ => {}
        }

        if !self.units_per_cycle.is_finite() || self.units_per_cycle <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "units per cycle must be positive, got {}",
                self.units_per_cycle
            )));
        }

        if !(0.0..=1.0).contains(&self.click_volume) {
            return Err(ConfigError::Invalid(format!(
                "click volume must be within 0.0..=1.0, got {}",
                self.click_volume
            )));
        }

        Ok(())
    }

    /// Parse and validate a RON document
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default();
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load from disk; format is picked from the extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;

        if is_json_path(path) {
            Self::from_json_str(&source)
        } else {
            Self::from_ron_str(&source)
        }
    }

    /// Write to disk (RON unless the path ends in `.json`), creating parent
    /// directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = if is_json_path(path) {
            serde_json::to_string_pretty(self)?
        } else {
            self.to_ron_string()?
        };
        fs::write(path, contents)?;
        Ok(())
    }

    /// `<config dir>/tempo_ramp/session.ron`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tempo_ramp").join("session.ron"))
    }

    /// Load the default file, falling back to defaults when it is missing
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}
