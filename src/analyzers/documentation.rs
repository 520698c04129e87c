//! Documentation category (max 20).

use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::{Analyzer, AnalyzerFuture, Target};
use crate::data::{Category, DocumentationDetails, ScoreComponent};

/// Primary doc file name.
pub const PRIMARY_DOC: &str = "SKILL.md";

/// Secondary doc file name.
pub const SECONDARY_DOC: &str = "README.md";

/// Characters the primary doc needs to earn its points.
pub const PRIMARY_DOC_MIN_LENGTH: usize = 500;

/// Characters the secondary doc needs to earn its points.
pub const SECONDARY_DOC_MIN_LENGTH: usize = 200;

const PRIMARY_DOC_POINTS: u32 = 10;
const SECONDARY_DOC_POINTS: u32 = 5;
const EXAMPLES_POINTS: u32 = 3;
const REFERENCES_POINTS: u32 = 2;

static EXAMPLES_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s{0,3}#{1,6}\s*(examples?|usage)\b").unwrap());

static REFERENCES_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s{0,3}#{1,6}\s*(references?|resources|links|see also)\b").unwrap()
});

/// Whether markdown contains an examples or usage heading.
pub fn has_examples_section(markdown: &str) -> bool {
    EXAMPLES_HEADING.is_match(markdown)
}

/// Whether markdown contains a references heading.
pub fn has_references_section(markdown: &str) -> bool {
    REFERENCES_HEADING.is_match(markdown)
}

/// Reads a doc file; `Ok(None)` when it does not exist.
async fn read_doc(path: &Path) -> std::io::Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Scores presence, length and structure of the skill's docs.
#[derive(Debug, Default)]
pub struct DocumentationAnalyzer;

impl DocumentationAnalyzer {
    /// Creates the analyzer.
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for DocumentationAnalyzer {
    type Details = DocumentationDetails;

    fn category(&self) -> Category {
        Category::Documentation
    }

    fn analyze<'a>(&'a self, target: &'a Target) -> AnalyzerFuture<'a, DocumentationDetails> {
        Box::pin(async move {
            let mut details = DocumentationDetails::default();
            let mut errors = Vec::new();
            let mut combined = String::new();

            let primary_path = target.path.join(PRIMARY_DOC);
            let secondary_path = target.path.join(SECONDARY_DOC);
            let (primary, secondary) =
                futures::join!(read_doc(&primary_path), read_doc(&secondary_path));

            let mut doc_content = |name: &str, result: std::io::Result<Option<String>>| {
                match result {
                    Ok(content) => content,
                    Err(e) => {
                        warn!(file = name, error = %e, "Failed to read doc file");
                        errors.push(format!("{name}: {e}"));
                        None
                    }
                }
            };

            let primary = doc_content(PRIMARY_DOC, primary);
            let secondary = doc_content(SECONDARY_DOC, secondary);

            let mut score = 0;

            if let Some(content) = primary {
                details.has_skill_md = true;
                details.skill_md_length = content.chars().count();
                if details.skill_md_length >= PRIMARY_DOC_MIN_LENGTH {
                    score += PRIMARY_DOC_POINTS;
                }
                combined.push_str(&content);
                combined.push('\n');
            }

            if let Some(content) = secondary {
                details.has_readme = true;
                details.readme_length = content.chars().count();
                if details.readme_length >= SECONDARY_DOC_MIN_LENGTH {
                    score += SECONDARY_DOC_POINTS;
                }
                combined.push_str(&content);
            }

            details.has_examples = has_examples_section(&combined);
            if details.has_examples {
                score += EXAMPLES_POINTS;
            }

            details.has_references = has_references_section(&combined);
            if details.has_references {
                score += REFERENCES_POINTS;
            }

            if !errors.is_empty() {
                details.error = Some(errors.join("; "));
            }

            debug!(
                score,
                skill_md_length = details.skill_md_length,
                readme_length = details.readme_length,
                "Documentation analysis complete"
            );

            Ok(ScoreComponent::new(Category::Documentation, score, details))
        })
    }
}
