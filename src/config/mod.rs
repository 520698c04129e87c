//! Scorer configuration: external endpoints, scanner location and time budgets.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::settings::Settings;

/// Default reputation service base URL.
pub const DEFAULT_REPUTATION_ENDPOINT: &str = "https://clawhub.ai/api/v1/skills/reputation";

/// Default scanner executable, resolved through `PATH`.
pub const DEFAULT_SCANNER: &str = "skill-scanner";

/// Environment variable overriding the reputation endpoint.
pub const ENV_REPUTATION_URL: &str = "SKILL_SCORECARD_REPUTATION_URL";

/// Environment variable overriding the scanner executable.
pub const ENV_SCANNER: &str = "SKILL_SCORECARD_SCANNER";

/// Environment variable overriding the scanner timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "SKILL_SCORECARD_TIMEOUT_MS";

/// Configuration injected into the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScorerConfig {
    /// Base URL of the reputation lookup; the skill name is appended.
    pub reputation_endpoint: String,

    /// Time budget for the reputation lookup.
    pub reputation_timeout_ms: u64,

    /// Path or name of the static scanner executable.
    pub scanner_executable_path: PathBuf,

    /// Arguments placed before the skill path when invoking the scanner.
    pub scanner_args: Vec<String>,

    /// Time budget for the static scanner run.
    pub scanner_timeout_ms: u64,

    /// Cap on captured scanner stdout.
    pub scanner_max_output_bytes: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            reputation_endpoint: DEFAULT_REPUTATION_ENDPOINT.to_string(),
            reputation_timeout_ms: 10_000,
            scanner_executable_path: PathBuf::from(DEFAULT_SCANNER),
            scanner_args: vec!["--format".to_string(), "json".to_string()],
            scanner_timeout_ms: 60_000,
            scanner_max_output_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ScorerConfig {
    /// Reputation lookup timeout as a [`Duration`].
    pub fn reputation_timeout(&self) -> Duration {
        Duration::from_millis(self.reputation_timeout_ms)
    }

    /// Scanner timeout as a [`Duration`].
    pub fn scanner_timeout(&self) -> Duration {
        Duration::from_millis(self.scanner_timeout_ms)
    }

    /// Applies environment overrides, falling back to the settings file.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(&Settings::load_or_default())
    }

    /// Applies `SKILL_SCORECARD_*` overrides resolved through `settings`.
    pub fn with_overrides_from(mut self, settings: &Settings) -> Result<Self> {
        if let Some(url) = settings.get_env_var(ENV_REPUTATION_URL) {
            self.reputation_endpoint = url;
        }
        if let Some(scanner) = settings.get_env_var(ENV_SCANNER) {
            self.scanner_executable_path = PathBuf::from(scanner);
        }
        if let Some(timeout) = settings.get_env_var(ENV_TIMEOUT_MS) {
            self.scanner_timeout_ms = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_TIMEOUT_MS} value: {timeout}"))?;
        }
        Ok(self)
    }
}

/// Loads [`ScorerConfig`] from a JSON file.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }
}

impl ConfigManager {
    /// Creates a configuration manager for the default location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration manager with a custom config path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Returns the default config path (~/.skill-scorecard/config.json).
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".skill-scorecard")
            .join("config.json")
    }

    /// Loads the config file, falling back to defaults when it does not exist.
    pub fn load(&self) -> Result<ScorerConfig> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(ScorerConfig::default());
        }

        let content = std::fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file: {:?}", self.config_path))?;

        let config: ScorerConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", self.config_path))?;

        Ok(config)
    }

    /// Writes a config file, creating its directory if needed.
    pub fn save(&self, config: &ScorerConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

        std::fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", self.config_path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ScorerConfig::default();
        assert_eq!(config.reputation_endpoint, DEFAULT_REPUTATION_ENDPOINT);
        assert_eq!(config.scanner_executable_path, PathBuf::from("skill-scanner"));
        assert_eq!(config.scanner_args, vec!["--format", "json"]);
        assert_eq!(config.scanner_timeout(), Duration::from_secs(60));
        assert_eq!(config.reputation_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("config.json"));
        assert_eq!(manager.load().unwrap(), ScorerConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "reputationEndpoint": "http://localhost:9999/rep", "scannerTimeoutMs": 500 }"#,
        )
        .unwrap();

        let config = ConfigManager::with_path(path).load().unwrap();
        assert_eq!(config.reputation_endpoint, "http://localhost:9999/rep");
        assert_eq!(config.scanner_timeout_ms, 500);
        assert_eq!(config.scanner_max_output_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");
        let manager = ConfigManager::with_path(path.clone());

        let config = ScorerConfig {
            scanner_executable_path: PathBuf::from("/opt/scanner/bin/scan"),
            ..Default::default()
        };
        manager.save(&config).unwrap();
        assert!(path.exists());
        assert_eq!(manager.load().unwrap(), config);
    }

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        Settings {
            env: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_settings_file_supplies_overrides() {
        let vars = [ENV_REPUTATION_URL, ENV_SCANNER, ENV_TIMEOUT_MS];
        if vars.iter().any(|v| std::env::var(v).is_ok()) {
            return;
        }

        let config = ScorerConfig::default()
            .with_overrides_from(&settings(&[
                (ENV_REPUTATION_URL, "http://mirror.local/reputation"),
                (ENV_SCANNER, "/opt/scanners/skill-scanner"),
                (ENV_TIMEOUT_MS, " 1500 "),
            ]))
            .unwrap();
        assert_eq!(config.reputation_endpoint, "http://mirror.local/reputation");
        assert_eq!(
            config.scanner_executable_path,
            PathBuf::from("/opt/scanners/skill-scanner")
        );
        assert_eq!(config.scanner_timeout_ms, 1500);

        let err = ScorerConfig::default()
            .with_overrides_from(&settings(&[(ENV_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_MS));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(ConfigManager::with_path(path).load().is_err());
    }
}
