//! Automation settings: the operator's switchboard.
//!
//! Settings are re-read at the start of every run, so flipping a flag in
//! the file takes effect on the next run without restarting anything.
//! Loading is deliberately forgiving: a missing or malformed file means
//! full automation, because these flags exist to restrict an otherwise
//! autonomous pipeline, not to arm it.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Settings file name inside the data directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// What an accepted draft is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationSettings {
    /// Master switch. When false an accepted run completes as a no-op.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Route accepted drafts to the review queue instead of publishing.
    #[serde(default)]
    pub manual_only: bool,

    /// Kill switch. Aborts the run before any store write.
    #[serde(default)]
    pub emergency_stop: bool,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            manual_only: false,
            emergency_stop: false,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// On-disk shape of `settings.json`: `{ "automation": { ... } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub automation: AutomationSettings,
}

impl AutomationSettings {
    /// Load settings from a JSON file, degrading to defaults when the
    /// file is missing, unreadable, or malformed. This never fails; a
    /// broken settings file is worth a warning, not a dead pipeline.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<SettingsFile>(&content) {
                Ok(file) => file.automation,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "settings file is malformed, using defaults"
                    );
                    Self::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "settings file is unreadable, using defaults"
                );
                Self::default()
            }
        }
    }
}
