//! Fallback values for the `SKILL_SCORECARD_*` environment variables.
//!
//! A machine that always scores against the same reputation mirror or scanner
//! can pin them in `$HOME/.skill-scorecard/settings.json` instead of exporting
//! variables in every shell:
//!
//! ```json
//! { "env": { "SKILL_SCORECARD_SCANNER": "/opt/scanners/skill-scanner" } }
//! ```
//!
//! A variable set in the process always wins over the file.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

/// Directory under `$HOME` holding the scorecard's files.
pub const SETTINGS_DIR: &str = ".skill-scorecard";

/// Settings file name inside [`SETTINGS_DIR`].
pub const SETTINGS_FILE: &str = "settings.json";

/// Contents of the settings file.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Values used when the variable of the same name is unset.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads `$HOME/.skill-scorecard/settings.json`.
    pub fn load() -> Result<Self> {
        Self::load_from_path(Self::default_path()?)
    }

    /// Loads the settings file, degrading to empty settings when it is
    /// unreadable or malformed. Scoring never fails on account of this file.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "Ignoring scorecard settings file");
            Self::default()
        })
    }

    /// Loads settings from `path`; an absent file is empty settings.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// `$HOME/.skill-scorecard/settings.json`
    pub fn default_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home_dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    /// The process value of `key`, else the file's value.
    ///
    /// Blank values count as unset in both places.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.env.get(key).filter(|v| !v.trim().is_empty()).cloned())
    }
}
