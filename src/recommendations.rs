//! Remediation advice derived from a score breakdown.
//!
//! Rules live in one ordered table. Output order follows the table, so the
//! most severe advice always comes first.

use std::fmt;

use crate::analyzers::code_quality::{COMMENT_DENSITY_MIN, ERROR_HANDLING_MIN_RATIO};
use crate::analyzers::documentation::{PRIMARY_DOC, PRIMARY_DOC_MIN_LENGTH};
use crate::analyzers::maintenance::RECENCY_WINDOW_DAYS;
use crate::data::{Breakdown, Category, ReputationTier};

/// Marker prepended to critical recommendations.
pub const CRITICAL_MARKER: &str = "🚨 CRITICAL: ";

/// A single piece of remediation advice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// Whether the advice concerns an active safety problem.
    pub critical: bool,
    /// Human-readable advice.
    pub message: String,
}

impl Recommendation {
    fn advice(message: impl Into<String>) -> Self {
        Self {
            critical: false,
            message: message.into(),
        }
    }

    fn critical(message: impl Into<String>) -> Self {
        Self {
            critical: true,
            message: message.into(),
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.critical {
            f.write_str(CRITICAL_MARKER)?;
        }
        f.write_str(&self.message)
    }
}

/// A named check producing advice when its condition holds.
///
/// A rule reads only the details of its own `category`.
struct Rule {
    name: &'static str,
    category: Category,
    check: fn(&Breakdown) -> Option<Recommendation>,
}

fn plural(count: impl Into<u64>, one: &'static str, many: &'static str) -> &'static str {
    if count.into() == 1 {
        one
    } else {
        many
    }
}

const RULES: &[Rule] = &[
    Rule {
        name: "malicious-reputation",
        category: Category::Security,
        check: |b| {
            (b.security.details.reputation == ReputationTier::Malicious).then(|| {
                Recommendation::critical(
                    "Skill is flagged as malicious by the reputation service. Do not install it.",
                )
            })
        },
    },
    Rule {
        name: "critical-findings",
        category: Category::Security,
        check: |b| {
            let count = b.security.details.findings.critical;
            (count > 0).then(|| {
                Recommendation::advice(format!(
                    "Fix {count} critical security {} reported by the static scanner",
                    plural(count, "issue", "issues")
                ))
            })
        },
    },
    Rule {
        name: "high-findings",
        category: Category::Security,
        check: |b| {
            let count = b.security.details.findings.high;
            (count > 0).then(|| {
                Recommendation::advice(format!(
                    "Address {count} high severity security {} reported by the static scanner",
                    plural(count, "issue", "issues")
                ))
            })
        },
    },
    Rule {
        name: "primary-doc",
        category: Category::Documentation,
        check: |b| {
            let docs = &b.documentation.details;
            if !docs.has_skill_md {
                Some(Recommendation::advice(format!(
                    "Add a {PRIMARY_DOC} file describing what the skill does and how to use it"
                )))
            } else if docs.skill_md_length < PRIMARY_DOC_MIN_LENGTH {
                Some(Recommendation::advice(format!(
                    "Expand {PRIMARY_DOC} to at least {PRIMARY_DOC_MIN_LENGTH} characters (currently {})",
                    docs.skill_md_length
                )))
            } else {
                None
            }
        },
    },
    Rule {
        name: "examples-section",
        category: Category::Documentation,
        check: |b| {
            (!b.documentation.details.has_examples)
                .then(|| Recommendation::advice("Add an Examples or Usage section to the documentation"))
        },
    },
    Rule {
        name: "references-section",
        category: Category::Documentation,
        check: |b| {
            (!b.documentation.details.has_references)
                .then(|| Recommendation::advice("Add a References section linking related resources"))
        },
    },
    Rule {
        name: "hardcoded-secrets",
        category: Category::CodeQuality,
        check: |b| {
            let count = b.code_quality.details.hardcoded_secrets;
            (count > 0).then(|| {
                Recommendation::critical(format!(
                    "Remove {count} hardcoded {} from the source files",
                    plural(count as u64, "secret", "secrets")
                ))
            })
        },
    },
    Rule {
        name: "error-handling",
        category: Category::CodeQuality,
        check: |b| {
            b.code_quality
                .details
                .error_handling_ratio
                .filter(|ratio| *ratio < ERROR_HANDLING_MIN_RATIO)
                .map(|ratio| {
                    Recommendation::advice(format!(
                        "Add error handling to more code files ({:.0}% covered, aim for {:.0}%)",
                        ratio * 100.0,
                        ERROR_HANDLING_MIN_RATIO * 100.0
                    ))
                })
        },
    },
    Rule {
        name: "comment-density",
        category: Category::CodeQuality,
        check: |b| {
            b.code_quality
                .details
                .comment_density
                .filter(|density| *density < COMMENT_DENSITY_MIN)
                .map(|density| {
                    Recommendation::advice(format!(
                        "Add comments to explain the code ({:.0}% of lines, aim for {:.0}%)",
                        density * 100.0,
                        COMMENT_DENSITY_MIN * 100.0
                    ))
                })
        },
    },
    Rule {
        name: "version-control",
        category: Category::Maintenance,
        check: |b| {
            (!b.maintenance.details.has_git)
                .then(|| Recommendation::advice("Track the skill in version control (git init)"))
        },
    },
    Rule {
        name: "stale-history",
        category: Category::Maintenance,
        check: |b| {
            b.maintenance
                .details
                .days_since_last_commit
                .filter(|days| *days > RECENCY_WINDOW_DAYS)
                .map(|days| {
                    Recommendation::advice(format!(
                        "Last change was {days} days ago; review and update the skill"
                    ))
                })
        },
    },
    Rule {
        name: "version-artifact",
        category: Category::Maintenance,
        check: |b| {
            b.maintenance.details.version_file.is_none().then(|| {
                Recommendation::advice("Add a VERSION file or CHANGELOG.md to track releases")
            })
        },
    },
];

/// Evaluates every rule in priority order.
///
/// Rules of a category whose analyzer failed are skipped, since its details
/// are defaults and not findings.
pub fn recommendations(breakdown: &Breakdown) -> Vec<Recommendation> {
    RULES
        .iter()
        .filter(|rule| !breakdown.failed(rule.category))
        .filter_map(|rule| {
            let recommendation = (rule.check)(breakdown)?;
            tracing::trace!(rule = rule.name, "Recommendation rule fired");
            Some(recommendation)
        })
        .collect()
}
