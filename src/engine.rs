//! Scoring engine: runs the four analyzers concurrently and merges their results.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::analyzers::{
    isolate, Analyzer, CodeQualityAnalyzer, DocumentationAnalyzer, ExternalScanner,
    HttpReputationClient, Isolated, MaintenanceAnalyzer, SecurityAnalyzer, Target,
};
use crate::config::ScorerConfig;
use crate::data::{
    Breakdown, Category, CodeQualityDetails, DocumentationDetails, Grade, MaintenanceDetails,
    ScoreResult, SecurityDetails, MAX_SCORE,
};
use crate::error::ScoreError;
use crate::recommendations::recommendations;

type BoxedAnalyzer<D> = Box<dyn Analyzer<Details = D>>;

/// Rates skill directories.
///
/// Each analyzer is wrapped with [`isolate`], so a failing or panicking
/// analyzer costs its own category and nothing else.
pub struct Scorer {
    security: Isolated<BoxedAnalyzer<SecurityDetails>>,
    documentation: Isolated<BoxedAnalyzer<DocumentationDetails>>,
    code_quality: Isolated<BoxedAnalyzer<CodeQualityDetails>>,
    maintenance: Isolated<BoxedAnalyzer<MaintenanceDetails>>,
}

impl Scorer {
    /// Builds the default analyzers from configuration.
    pub fn new(config: &ScorerConfig) -> Self {
        let reputation =
            HttpReputationClient::new(config.reputation_endpoint.clone(), config.reputation_timeout());
        let scanner = ExternalScanner::new(
            config.scanner_executable_path.clone(),
            config.scanner_args.clone(),
            config.scanner_timeout(),
            config.scanner_max_output_bytes,
        );

        Self::with_analyzers(
            Box::new(SecurityAnalyzer::new(Box::new(reputation), Box::new(scanner))),
            Box::new(DocumentationAnalyzer::new()),
            Box::new(CodeQualityAnalyzer::new()),
            Box::new(MaintenanceAnalyzer::new()),
        )
    }

    /// Builds a scorer from explicit analyzers.
    pub fn with_analyzers(
        security: BoxedAnalyzer<SecurityDetails>,
        documentation: BoxedAnalyzer<DocumentationDetails>,
        code_quality: BoxedAnalyzer<CodeQualityDetails>,
        maintenance: BoxedAnalyzer<MaintenanceDetails>,
    ) -> Self {
        Self {
            security: isolate(security),
            documentation: isolate(documentation),
            code_quality: isolate(code_quality),
            maintenance: isolate(maintenance),
        }
    }

    /// Scores the skill at `path`.
    ///
    /// `name` replaces the directory basename for the reputation lookup and
    /// display. Only an unresolvable path fails; analyzer failures degrade
    /// their own category.
    pub async fn score(&self, path: &Path, name: Option<&str>) -> Result<ScoreResult, ScoreError> {
        let target = resolve_target(path, name)?;

        let timestamp = Utc::now();
        let started = Instant::now();
        info!(skill = %target.name, path = %target.path.display(), "Scoring skill");

        let (security, documentation, code_quality, maintenance) = futures::join!(
            self.security.run(&target),
            self.documentation.run(&target),
            self.code_quality.run(&target),
            self.maintenance.run(&target),
        );

        let breakdown = Breakdown {
            security,
            documentation,
            code_quality,
            maintenance,
        };

        for category in Category::ALL {
            if let Some(error) = breakdown.error_of(category) {
                let (score, max) = breakdown.score_of(category);
                warn!(category = %category, score, max, error, "Category degraded");
            }
        }

        let overall_score = breakdown.total();
        let grade = Grade::from_score(overall_score);
        let recommendations = recommendations(&breakdown)
            .iter()
            .map(ToString::to_string)
            .collect();
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            skill = %target.name,
            overall_score,
            grade = %grade,
            duration_ms,
            "Scoring complete"
        );

        Ok(ScoreResult {
            skill: target.name,
            path: target.path,
            timestamp,
            duration_ms,
            overall_score,
            max_score: MAX_SCORE,
            grade,
            breakdown,
            recommendations,
        })
    }
}

/// Resolves a user-supplied path into a scoring target.
fn resolve_target(path: &Path, name: Option<&str>) -> Result<Target, ScoreError> {
    let resolved = path
        .canonicalize()
        .map_err(|source| ScoreError::TargetNotFound {
            path: path.to_path_buf(),
            source,
        })?;

    if !resolved.is_dir() {
        return Err(ScoreError::NotADirectory(resolved));
    }

    let name = match name {
        Some(name) => name.to_string(),
        None => resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| resolved.display().to_string()),
    };

    Ok(Target::new(name, resolved))
}
