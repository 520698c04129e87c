//! Category-specific sub-findings attached to each score component.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shared behavior of the per-category detail records.
pub trait ComponentDetails: Default + Serialize + Send + 'static {
    /// Returns the failure annotation, if any.
    fn error(&self) -> Option<&str>;

    /// Records a failure annotation.
    fn set_error(&mut self, error: String);
}

macro_rules! impl_component_details {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ComponentDetails for $ty {
                fn error(&self) -> Option<&str> {
                    self.error.as_deref()
                }

                fn set_error(&mut self, error: String) {
                    self.error = Some(error);
                }
            }
        )+
    };
}

impl_component_details!(
    SecurityDetails,
    DocumentationDetails,
    CodeQualityDetails,
    MaintenanceDetails,
);

/// Trust tier returned by the reputation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReputationTier {
    /// Known good.
    Benign,
    /// Not classified, or the lookup failed.
    #[default]
    Unknown,
    /// Known bad.
    Malicious,
}

impl ReputationTier {
    /// Points contributed to the security category.
    pub const fn points(self) -> u32 {
        match self {
            Self::Benign => 20,
            Self::Unknown => 10,
            Self::Malicious => 0,
        }
    }

    /// Classifies a status string reported by the reputation service.
    pub fn from_status(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "benign" | "safe" | "clean" | "verified" | "trusted" => Self::Benign,
            "malicious" | "dangerous" | "blocked" => Self::Malicious,
            other => {
                tracing::debug!("Unrecognized reputation status {other:?}, treating as unknown");
                Self::Unknown
            }
        }
    }
}

impl fmt::Display for ReputationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Benign => write!(f, "benign"),
            Self::Unknown => write!(f, "unknown"),
            Self::Malicious => write!(f, "malicious"),
        }
    }
}

/// Number of static-scan findings per severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// Critical findings.
    pub critical: u32,
    /// High findings.
    pub high: u32,
    /// Medium findings.
    pub medium: u32,
    /// Low findings, including unrecognized severities.
    pub low: u32,
}

impl SeverityCounts {
    /// Total number of findings.
    pub const fn total(&self) -> u32 {
        self.critical + self.high + self.medium + self.low
    }
}

/// Security sub-findings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityDetails {
    /// Tier reported by the reputation lookup.
    pub reputation: ReputationTier,
    /// Points from the reputation lookup.
    pub reputation_score: u32,
    /// Why the reputation lookup failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reputation_error: Option<String>,
    /// Points from the static scan.
    pub scan_score: u32,
    /// Whether the static scanner produced a report.
    pub scanner_available: bool,
    /// Findings per severity.
    pub findings: SeverityCounts,
    /// Raw scanner findings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub raw_findings: Vec<serde_json::Value>,
    /// Why the static scan failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_error: Option<String>,
    /// Category-level failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Documentation sub-findings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationDetails {
    /// Whether the primary doc file exists.
    pub has_skill_md: bool,
    /// Length of the primary doc file in characters.
    pub skill_md_length: usize,
    /// Whether the secondary doc file exists.
    pub has_readme: bool,
    /// Length of the secondary doc file in characters.
    pub readme_length: usize,
    /// Whether an examples or usage section was found.
    pub has_examples: bool,
    /// Whether a references section was found.
    pub has_references: bool,
    /// Category-level failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A hardcoded-secret match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretFinding {
    /// Path relative to the skill root.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// Name of the matching pattern.
    pub kind: String,
}

/// Code quality sub-findings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeQualityDetails {
    /// Files visited by the walk (code and docs).
    pub files_analyzed: usize,
    /// Files counted towards the code ratios.
    pub code_files: usize,
    /// Number of hardcoded-secret matches.
    pub hardcoded_secrets: usize,
    /// Where the secrets were found.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secret_locations: Vec<SecretFinding>,
    /// Share of code files with error handling; absent without code files.
    pub error_handling_ratio: Option<f64>,
    /// Average comment density; absent without code files.
    pub comment_density: Option<f64>,
    /// Share of code files following a naming convention.
    pub naming_ratio: Option<f64>,
    /// Category-level failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Maintenance sub-findings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceDetails {
    /// Whether a `.git` directory is present in the skill.
    pub has_git: bool,
    /// Time of the most recent commit touching the skill.
    pub last_commit: Option<DateTime<Utc>>,
    /// Days elapsed since `last_commit`.
    pub days_since_last_commit: Option<i64>,
    /// Name of the version or changelog artifact found.
    pub version_file: Option<String>,
    /// Category-level failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reputation_status_is_case_insensitive() {
        assert_eq!(ReputationTier::from_status("BENIGN"), ReputationTier::Benign);
        assert_eq!(ReputationTier::from_status(" Malicious "), ReputationTier::Malicious);
        assert_eq!(ReputationTier::from_status("suspicious"), ReputationTier::Unknown);
        assert_eq!(ReputationTier::from_status(""), ReputationTier::Unknown);
    }

    #[test]
    fn reputation_points() {
        assert_eq!(ReputationTier::Benign.points(), 20);
        assert_eq!(ReputationTier::Unknown.points(), 10);
        assert_eq!(ReputationTier::Malicious.points(), 0);
    }

    #[test]
    fn error_round_trips_through_trait() {
        let mut details = MaintenanceDetails::default();
        assert!(details.error().is_none());
        details.set_error("git unavailable".to_string());
        assert_eq!(details.error(), Some("git unavailable"));
    }

    #[test]
    fn ratios_serialize_as_null_when_absent() {
        let json = serde_json::to_value(CodeQualityDetails::default()).unwrap();
        assert!(json["errorHandlingRatio"].is_null());
        assert_eq!(json["hardcodedSecrets"], 0);
        assert!(json.get("error").is_none());
    }
}
