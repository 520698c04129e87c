//! Maintenance category (max 20).

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::{Analyzer, AnalyzerFuture, Target};
use crate::data::{Category, MaintenanceDetails, ScoreComponent};
use crate::git::{GitRepository, GIT_DIR};

/// Days within which the last change counts as recent (about six months).
pub const RECENCY_WINDOW_DAYS: i64 = 180;

/// Files accepted as a version or changelog artifact, in lookup order.
pub const VERSION_FILES: &[&str] = &[
    "VERSION",
    "CHANGELOG.md",
    "CHANGELOG",
    "HISTORY.md",
    "Cargo.toml",
    "pyproject.toml",
];

const GIT_POINTS: u32 = 5;
const RECENT_POINTS: u32 = 10;
const VERSION_POINTS: u32 = 5;

/// Whether markdown front matter declares a `version:` key.
fn front_matter_has_version(markdown: &str) -> bool {
    let mut lines = markdown.lines();
    if lines.next().map(str::trim) != Some("---") {
        return false;
    }
    lines
        .take_while(|line| line.trim() != "---")
        .any(|line| line.trim_start().starts_with("version:"))
}

/// Finds a version or changelog artifact in the skill root.
pub fn find_version_artifact(root: &Path) -> Option<String> {
    if let Some(name) = VERSION_FILES.iter().find(|name| root.join(name).is_file()) {
        return Some((*name).to_string());
    }

    let package_json = root.join("package.json");
    if let Ok(content) = std::fs::read_to_string(&package_json) {
        let has_version = serde_json::from_str::<serde_json::Value>(&content)
            .ok()
            .and_then(|v| v.get("version").and_then(|v| v.as_str()).map(|s| !s.is_empty()))
            .unwrap_or(false);
        if has_version {
            return Some("package.json".to_string());
        }
    }

    let skill_md = root.join("SKILL.md");
    if let Ok(content) = std::fs::read_to_string(&skill_md) {
        if front_matter_has_version(&content) {
            return Some("SKILL.md".to_string());
        }
    }

    None
}

/// Most recent commit touching `path`, from the repository containing it.
fn last_change(path: &Path) -> Result<Option<DateTime<Utc>>> {
    match GitRepository::discover(path)? {
        Some(repo) => repo.last_change(path),
        None => Ok(None),
    }
}

/// Scores version control activity and release hygiene.
#[derive(Debug, Default)]
pub struct MaintenanceAnalyzer {
    now: Option<DateTime<Utc>>,
}

impl MaintenanceAnalyzer {
    /// Creates the analyzer using the system clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an analyzer that measures recency against a fixed instant.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

impl Analyzer for MaintenanceAnalyzer {
    type Details = MaintenanceDetails;

    fn category(&self) -> Category {
        Category::Maintenance
    }

    fn analyze<'a>(&'a self, target: &'a Target) -> AnalyzerFuture<'a, MaintenanceDetails> {
        Box::pin(async move {
            let now = self.now.unwrap_or_else(Utc::now);
            let root = target.path.clone();

            let (has_git, history, version_file) = tokio::task::spawn_blocking(move || {
                let has_git = root.join(GIT_DIR).exists();
                let history = last_change(&root);
                let version_file = find_version_artifact(&root);
                (has_git, history, version_file)
            })
            .await
            .context("Maintenance probe did not complete")?;

            let mut details = MaintenanceDetails {
                has_git,
                version_file,
                ..Default::default()
            };

            match history {
                Ok(last) => details.last_commit = last,
                Err(e) => {
                    warn!(path = %target.path.display(), error = %e, "Failed to read git history");
                    details.error = Some(format!("{e:#}"));
                }
            }
            details.days_since_last_commit = details
                .last_commit
                .map(|last| (now - last).num_days().max(0));

            let mut score = 0;
            if details.has_git {
                score += GIT_POINTS;
            }
            if details.last_commit.is_some_and(|last| now - last <= Duration::days(RECENCY_WINDOW_DAYS)) {
                score += RECENT_POINTS;
            }
            if details.version_file.is_some() {
                score += VERSION_POINTS;
            }

            debug!(
                score,
                has_git = details.has_git,
                days_since_last_commit = ?details.days_since_last_commit,
                version_file = ?details.version_file,
                "Maintenance analysis complete"
            );

            Ok(ScoreComponent::new(Category::Maintenance, score, details))
        })
    }
}
