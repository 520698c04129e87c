//! Code quality category (max 20).
//!
//! Walks the skill directory, restricted to known code and doc extensions,
//! and scores:
//! - absence of hardcoded secrets (10 pts)
//! - share of code files with error handling (5 pts)
//! - average comment density of code files (3 pts)
//! - share of code files following a naming convention (2 pts)
//!
//! The three ratios are computed over code files only. Without code files
//! they are absent and earn nothing, while the secret check passes vacuously.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::{Analyzer, AnalyzerFuture, Target};
use crate::data::{Category, CodeQualityDetails, ScoreComponent, SecretFinding};

/// Extensions counted as code.
pub const CODE_EXTENSIONS: &[&str] = &[
    "js", "ts", "mjs", "cjs", "py", "sh", "bash", "rb", "go", "rs",
];

/// Extensions scanned for secrets but excluded from the code ratios.
pub const DOC_EXTENSIONS: &[&str] = &["md", "json", "yaml", "yml", "toml"];

/// Directories never descended into.
pub const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    ".vscode",
    ".idea",
    "dist",
    "build",
    "target",
    "__pycache__",
    "vendor",
    ".venv",
    "venv",
];

/// Files larger than this are not read.
pub const MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Minimum share of code files with error handling.
pub const ERROR_HANDLING_MIN_RATIO: f64 = 0.30;

/// Minimum average comment density.
pub const COMMENT_DENSITY_MIN: f64 = 0.10;

/// Minimum share of conventionally named code files.
pub const NAMING_MIN_RATIO: f64 = 0.50;

const NO_SECRETS_POINTS: u32 = 10;
const ERROR_HANDLING_POINTS: u32 = 5;
const COMMENT_POINTS: u32 = 3;
const NAMING_POINTS: u32 = 2;

/// Secret locations kept in the details.
const MAX_RECORDED_SECRETS: usize = 50;

struct SecretPattern {
    name: &'static str,
    pattern: Regex,
}

static SECRET_PATTERNS: LazyLock<Vec<SecretPattern>> = LazyLock::new(|| {
    [
        ("AWS Access Key ID", r"\bAKIA[0-9A-Z]{16}\b"),
        ("GitHub Token", r"\bgh[pousr]_[A-Za-z0-9]{36,}\b"),
        (
            "Private Key",
            r"-----BEGIN (RSA |EC |DSA |OPENSSH |PGP )?PRIVATE KEY",
        ),
        ("Slack Token", r"\bxox[baprs]-[0-9A-Za-z-]{10,}"),
        ("Stripe Live Key", r"\b[sr]k_live_[0-9a-zA-Z]{24,}"),
        ("OpenAI API Key", r"\bsk-(proj-)?[A-Za-z0-9_-]{32,}"),
        (
            "Generic API Key",
            r#"(?i)\b(api[_-]?key|access[_-]?key)\s*[=:]\s*["'][A-Za-z0-9_\-/+=]{16,}["']"#,
        ),
        (
            "Generic Secret",
            r#"(?i)\b(secret|password|passwd|auth[_-]?token)\s*[=:]\s*["'][^"'\s]{8,}["']"#,
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| SecretPattern {
        name,
        pattern: Regex::new(pattern).unwrap(),
    })
    .collect()
});

static ERROR_HANDLING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\btry\s*[{:]|\bcatch\b|\bexcept\b|\.catch\(|Result<|\?;|\bset -e|\|\|\s*exit\b|if err != nil|\brescue\b)",
    )
    .unwrap()
});

static CONVENTIONAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]+([_-][a-z0-9]+)*|[a-z][a-zA-Z0-9]*)$").unwrap()
});

/// What a walk over the skill found, before scoring.
#[derive(Debug, Default)]
struct TreeStats {
    files_analyzed: usize,
    code_files: usize,
    secrets: Vec<SecretFinding>,
    secret_count: usize,
    files_with_error_handling: usize,
    density_sum: f64,
    conventionally_named: usize,
    unreadable: usize,
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// Whether a line is a comment in any of the supported languages.
fn is_comment_line(trimmed: &str) -> bool {
    (trimmed.starts_with('#') && !trimmed.starts_with("#!"))
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with("\"\"\"")
        || trimmed.starts_with("'''")
}

/// Share of non-blank lines that are comments.
pub fn comment_density(content: &str) -> f64 {
    let mut non_blank = 0usize;
    let mut comments = 0usize;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        non_blank += 1;
        if is_comment_line(trimmed) {
            comments += 1;
        }
    }
    if non_blank == 0 {
        0.0
    } else {
        comments as f64 / non_blank as f64
    }
}

/// Whether file content contains an error handling construct.
pub fn has_error_handling(content: &str) -> bool {
    ERROR_HANDLING.is_match(content)
}

/// Whether a file name follows kebab-case, snake_case or lower camelCase.
///
/// Every dot-separated part before the extension must conform, so
/// `weather.test.ts` passes and `MyScript.py` does not.
pub fn is_conventional_name(file_name: &str) -> bool {
    let name = file_name.trim_start_matches('.');
    let stem = match name.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => name,
    };
    !stem.is_empty() && stem.split('.').all(|part| CONVENTIONAL_NAME.is_match(part))
}

/// Finds hardcoded secrets, at most one per line.
fn find_secrets(relative: &str, content: &str) -> Vec<SecretFinding> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            SECRET_PATTERNS
                .iter()
                .find(|p| p.pattern.is_match(line))
                .map(|p| SecretFinding {
                    file: relative.to_string(),
                    line: index + 1,
                    kind: p.name.to_string(),
                })
        })
        .collect()
}

fn walk(root: &Path) -> TreeStats {
    let mut stats = TreeStats::default();

    let entries = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable directory entry");
                stats.unreadable += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(extension) = extension_of(path) else {
            continue;
        };
        let is_code = CODE_EXTENSIONS.contains(&extension.as_str());
        if !is_code && !DOC_EXTENSIONS.contains(&extension.as_str()) {
            continue;
        }

        if entry.metadata().map(|m| m.len() > MAX_FILE_BYTES).unwrap_or(false) {
            debug!(file = %path.display(), "Skipping oversized file");
            continue;
        }

        let content = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                debug!(file = %path.display(), error = %e, "Skipping unreadable file");
                stats.unreadable += 1;
                continue;
            }
        };

        stats.files_analyzed += 1;

        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();
        let secrets = find_secrets(&relative, &content);
        stats.secret_count += secrets.len();
        let room = MAX_RECORDED_SECRETS.saturating_sub(stats.secrets.len());
        stats.secrets.extend(secrets.into_iter().take(room));

        if is_code {
            stats.code_files += 1;
            if has_error_handling(&content) {
                stats.files_with_error_handling += 1;
            }
            stats.density_sum += comment_density(&content);
            if entry
                .file_name()
                .to_str()
                .is_some_and(is_conventional_name)
            {
                stats.conventionally_named += 1;
            }
        }
    }

    stats
}

fn score_tree(stats: TreeStats) -> (u32, CodeQualityDetails) {
    let ratio = |count: usize| {
        (stats.code_files > 0).then(|| count as f64 / stats.code_files as f64)
    };

    let details = CodeQualityDetails {
        files_analyzed: stats.files_analyzed,
        code_files: stats.code_files,
        hardcoded_secrets: stats.secret_count,
        secret_locations: stats.secrets,
        error_handling_ratio: ratio(stats.files_with_error_handling),
        comment_density: (stats.code_files > 0)
            .then(|| stats.density_sum / stats.code_files as f64),
        naming_ratio: ratio(stats.conventionally_named),
        error: (stats.unreadable > 0)
            .then(|| format!("{} entries could not be read", stats.unreadable)),
    };

    let mut score = 0;
    if details.hardcoded_secrets == 0 {
        score += NO_SECRETS_POINTS;
    }
    if details
        .error_handling_ratio
        .is_some_and(|r| r >= ERROR_HANDLING_MIN_RATIO)
    {
        score += ERROR_HANDLING_POINTS;
    }
    if details.comment_density.is_some_and(|d| d >= COMMENT_DENSITY_MIN) {
        score += COMMENT_POINTS;
    }
    if details.naming_ratio.is_some_and(|r| r >= NAMING_MIN_RATIO) {
        score += NAMING_POINTS;
    }

    (score, details)
}

/// Scores secret hygiene and conventions of the skill's files.
#[derive(Debug, Default)]
pub struct CodeQualityAnalyzer;

impl CodeQualityAnalyzer {
    /// Creates the analyzer.
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for CodeQualityAnalyzer {
    type Details = CodeQualityDetails;

    fn category(&self) -> Category {
        Category::CodeQuality
    }

    fn analyze<'a>(&'a self, target: &'a Target) -> AnalyzerFuture<'a, CodeQualityDetails> {
        Box::pin(async move {
            let root = target.path.clone();
            let stats = tokio::task::spawn_blocking(move || walk(&root))
                .await
                .context("Code quality walk did not complete")?;

            let (score, details) = score_tree(stats);
            if details.hardcoded_secrets > 0 {
                warn!(
                    count = details.hardcoded_secrets,
                    "Hardcoded secrets detected"
                );
            }
            debug!(
                score,
                files = details.files_analyzed,
                code_files = details.code_files,
                "Code quality analysis complete"
            );

            Ok(ScoreComponent::new(Category::CodeQuality, score, details))
        })
    }
}
