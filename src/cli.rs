//! CLI interface for skill-scorecard.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{ConfigManager, ScorerConfig};
use crate::data::{self, OutputFormat};
use crate::engine::Scorer;

pub mod formatting;

/// skill-scorecard: rates a skill package for quality and safety.
#[derive(Parser, Debug)]
#[command(name = "skill-scorecard")]
#[command(about = "Scores a skill package for quality and safety (0-100, grade A-F)", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Skill directory to score.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Shorthand for `--format json`.
    #[arg(long, conflicts_with = "format")]
    pub json: bool,

    /// Skill name for the reputation lookup (defaults to the directory name).
    #[arg(long)]
    pub name: Option<String>,

    /// Explicit config file (defaults to ~/.skill-scorecard/config.json).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Reputation service base URL.
    #[arg(long, value_name = "URL")]
    pub reputation_endpoint: Option<String>,

    /// Static scanner executable.
    #[arg(long, value_name = "PATH")]
    pub scanner: Option<PathBuf>,

    /// Scanner time budget in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

impl Cli {
    /// Resolved output format.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }

    /// Builds the scorer configuration: file, then environment, then flags.
    pub fn resolve_config(&self) -> Result<ScorerConfig> {
        let manager = match &self.config {
            Some(path) => ConfigManager::with_path(path.clone()),
            None => ConfigManager::new(),
        };
        let mut config = manager.load()?.with_env_overrides()?;

        if let Some(endpoint) = &self.reputation_endpoint {
            config.reputation_endpoint = endpoint.clone();
        }
        if let Some(scanner) = &self.scanner {
            config.scanner_executable_path = scanner.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.scanner_timeout_ms = timeout_ms;
        }

        tracing::debug!(?config, "Resolved scorer configuration");
        Ok(config)
    }

    /// Scores the skill, prints the scorecard and returns the exit status.
    pub async fn execute(self) -> Result<i32> {
        let config = self.resolve_config()?;
        let scorer = Scorer::new(&config);

        let result = scorer
            .score(&self.path, self.name.as_deref())
            .await
            .with_context(|| format!("Failed to score {}", self.path.display()))?;

        let output = match self.output_format() {
            OutputFormat::Text => formatting::render_text(&result),
            OutputFormat::Json => data::to_json(&result)?,
            OutputFormat::Yaml => data::to_yaml(&result)?,
        };
        println!("{output}");

        Ok(result.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_path_and_defaults() {
        let cli = Cli::try_parse_from(["skill-scorecard", "./skills/weather"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("./skills/weather"));
        assert_eq!(cli.output_format(), OutputFormat::Text);
        assert!(cli.name.is_none());
    }

    #[test]
    fn json_flag_selects_json() {
        let cli = Cli::try_parse_from(["skill-scorecard", ".", "--json"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Json);
    }

    #[test]
    fn json_flag_conflicts_with_format() {
        assert!(Cli::try_parse_from(["skill-scorecard", ".", "--json", "--format", "yaml"]).is_err());
    }

    #[test]
    fn format_flag_is_validated() {
        let cli = Cli::try_parse_from(["skill-scorecard", ".", "--format", "yaml"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Yaml);
        assert!(Cli::try_parse_from(["skill-scorecard", ".", "--format", "html"]).is_err());
    }

    #[test]
    fn path_is_required() {
        assert!(Cli::try_parse_from(["skill-scorecard"]).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{ "reputationEndpoint": "http://file.example/rep", "scannerTimeoutMs": 1000 }"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "skill-scorecard",
            ".",
            "--config",
            config_path.to_str().unwrap(),
            "--scanner",
            "/opt/scan",
            "--timeout-ms",
            "250",
        ])
        .unwrap();

        let config = cli.resolve_config().unwrap();
        assert_eq!(config.scanner_executable_path, PathBuf::from("/opt/scan"));
        assert_eq!(config.scanner_timeout_ms, 250);
        if std::env::var(crate::config::ENV_REPUTATION_URL).is_err() {
            assert_eq!(config.reputation_endpoint, "http://file.example/rep");
        }
    }
}
