//! Tunable pipeline thresholds.
//!
//! Rules shape how strict the gates are; they are distinct from the
//! automation settings, which decide whether an accepted draft actually
//! publishes. Defaults match the publication's baseline. An optional TOML
//! file overrides them, and `WAVEPRESS__`-prefixed environment variables
//! override both (for example `WAVEPRESS__QUALITY__MIN_WORDS=800`).

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading pipeline rules.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("failed to load rules: {0}")]
    Load(#[from] ConfigError),

    #[error("invalid rules path: {0}")]
    InvalidPath(String),
}

/// Thresholds for the base quality gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityRules {
    /// Minimum markup-stripped word count.
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// Minimum trimmed title length, in characters.
    #[serde(default = "default_min_title_chars")]
    pub min_title_chars: usize,

    /// Minimum opening-paragraph length, in characters.
    #[serde(default = "default_min_hook_chars")]
    pub min_hook_chars: usize,
}

impl Default for QualityRules {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            min_title_chars: default_min_title_chars(),
            min_hook_chars: default_min_hook_chars(),
        }
    }
}

/// An inclusive local-hour interval during which publishing is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: u32,
    pub end: u32,
}

impl Window {
    pub fn contains(self, hour: u32) -> bool {
        hour >= self.start && hour <= self.end
    }
}

/// Cadence thresholds for the scheduler gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRules {
    /// Maximum posts per local calendar day.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: usize,

    /// Publish windows; morning, afternoon, and evening by default.
    #[serde(default = "default_windows")]
    pub windows: Vec<Window>,
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            windows: default_windows(),
        }
    }
}

/// All tunable thresholds for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRules {
    #[serde(default)]
    pub quality: QualityRules,

    #[serde(default)]
    pub schedule: ScheduleRules,
}

impl PipelineRules {
    /// Load rules from a TOML file plus environment overrides.
    ///
    /// A missing file is not an error; the defaults apply and environment
    /// variables can still override them. A file that exists but does not
    /// parse is a hard error, never silently ignored.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let mut builder = Config::builder();

        if path.exists() {
            let path_str = path
                .to_str()
                .ok_or_else(|| RulesError::InvalidPath(path.display().to_string()))?;
            builder = builder.add_source(File::with_name(path_str));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("WAVEPRESS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

fn default_min_words() -> usize {
    600
}

fn default_min_title_chars() -> usize {
    10
}

fn default_min_hook_chars() -> usize {
    80
}

fn default_daily_limit() -> usize {
    2
}

fn default_windows() -> Vec<Window> {
    vec![
        Window { start: 7, end: 11 },
        Window { start: 13, end: 16 },
        Window { start: 18, end: 21 },
    ]
}
