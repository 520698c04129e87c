//! Score components, breakdown, grade and the final scan result.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::details::{
    CodeQualityDetails, ComponentDetails, DocumentationDetails, MaintenanceDetails,
    SecurityDetails,
};

/// Highest achievable overall score.
pub const MAX_SCORE: u32 = 100;

/// One of the four top-level scoring dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Reputation lookup plus static scan.
    Security,
    /// Presence and structure of the skill's docs.
    Documentation,
    /// Secret hygiene and code conventions.
    CodeQuality,
    /// Version control activity and release artifacts.
    Maintenance,
}

impl Category {
    /// All categories in breakdown order.
    pub const ALL: [Self; 4] = [
        Self::Security,
        Self::Documentation,
        Self::CodeQuality,
        Self::Maintenance,
    ];

    /// Returns the fixed score ceiling of the category.
    pub const fn max(self) -> u32 {
        match self {
            Self::Security => 40,
            Self::Documentation | Self::CodeQuality | Self::Maintenance => 20,
        }
    }

    /// Returns a human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Security => "Security",
            Self::Documentation => "Documentation",
            Self::CodeQuality => "Code Quality",
            Self::Maintenance => "Maintenance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The result of a single analyzer.
///
/// `score` is always present, including when the analyzer failed; failure
/// degrades the score and records `details.error` instead of dropping the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent<D> {
    /// Points awarded, within `0..=max`.
    pub score: u32,
    /// Category ceiling.
    pub max: u32,
    /// Category-specific sub-findings.
    pub details: D,
    /// Set when the analyzer never produced findings, so `details` are
    /// placeholders rather than observations.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

impl<D: ComponentDetails> ScoreComponent<D> {
    /// Creates a component, clamping `score` to the category ceiling.
    pub fn new(category: Category, score: u32, details: D) -> Self {
        let max = category.max();
        Self {
            score: score.min(max),
            max,
            details,
            failed: false,
        }
    }

    /// Creates a zero-score component carrying a failure message.
    pub fn failed(category: Category, error: impl Into<String>) -> Self {
        let mut details = D::default();
        details.set_error(error.into());
        Self {
            failed: true,
            ..Self::new(category, 0, details)
        }
    }

    /// Returns the recorded failure, if any.
    pub fn error(&self) -> Option<&str> {
        self.details.error()
    }
}

/// The four category results of one scan, always complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    /// Security category (max 40).
    pub security: ScoreComponent<SecurityDetails>,
    /// Documentation category (max 20).
    pub documentation: ScoreComponent<DocumentationDetails>,
    /// Code quality category (max 20).
    pub code_quality: ScoreComponent<CodeQualityDetails>,
    /// Maintenance category (max 20).
    pub maintenance: ScoreComponent<MaintenanceDetails>,
}

impl Breakdown {
    /// Sum of the four component scores.
    pub fn total(&self) -> u32 {
        self.security.score
            + self.documentation.score
            + self.code_quality.score
            + self.maintenance.score
    }

    /// Returns `(score, max)` for a category.
    pub fn score_of(&self, category: Category) -> (u32, u32) {
        match category {
            Category::Security => (self.security.score, self.security.max),
            Category::Documentation => (self.documentation.score, self.documentation.max),
            Category::CodeQuality => (self.code_quality.score, self.code_quality.max),
            Category::Maintenance => (self.maintenance.score, self.maintenance.max),
        }
    }

    /// Whether the category's analyzer failed outright.
    pub fn failed(&self, category: Category) -> bool {
        match category {
            Category::Security => self.security.failed,
            Category::Documentation => self.documentation.failed,
            Category::CodeQuality => self.code_quality.failed,
            Category::Maintenance => self.maintenance.failed,
        }
    }

    /// Returns the failure recorded for a category, if any.
    pub fn error_of(&self, category: Category) -> Option<&str> {
        match category {
            Category::Security => self.security.error(),
            Category::Documentation => self.documentation.error(),
            Category::CodeQuality => self.code_quality.error(),
            Category::Maintenance => self.maintenance.error(),
        }
    }
}

/// Letter grade derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// 90 and above.
    A,
    /// 80..=89.
    B,
    /// 70..=79.
    C,
    /// 60..=69.
    D,
    /// Below 60.
    F,
}

impl Grade {
    /// Maps an overall score to its grade.
    pub const fn from_score(score: u32) -> Self {
        match score {
            90.. => Self::A,
            80..=89 => Self::B,
            70..=79 => Self::C,
            60..=69 => Self::D,
            _ => Self::F,
        }
    }

    /// Whether the grade counts as a pass for exit status purposes.
    pub const fn is_passing(self) -> bool {
        !matches!(self, Self::F)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(letter)
    }
}

/// Complete scorecard for one skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Skill name used for display and reputation lookup.
    pub skill: String,
    /// Resolved directory that was scanned.
    pub path: PathBuf,
    /// Scan start time.
    pub timestamp: DateTime<Utc>,
    /// Wall-clock duration of the scan.
    pub duration_ms: u64,
    /// Sum of the four category scores.
    pub overall_score: u32,
    /// Always [`MAX_SCORE`].
    pub max_score: u32,
    /// Letter grade for `overall_score`.
    pub grade: Grade,
    /// Per-category results.
    pub breakdown: Breakdown,
    /// Remediation advice, most severe first.
    pub recommendations: Vec<String>,
}

impl ScoreResult {
    /// Process exit status for this result: 0 for a passing grade, 1 for F.
    pub fn exit_code(&self) -> i32 {
        if self.grade.is_passing() {
            0
        } else {
            1
        }
    }
}
