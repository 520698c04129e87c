//! Security category: reputation lookup plus static scan (max 40).

use tracing::{debug, warn};

use super::{Analyzer, AnalyzerFuture, ReputationSource, StaticScanner, Target};
use crate::data::{Category, ReputationTier, ScoreComponent, SecurityDetails, SeverityCounts};

/// Scan score before deductions.
pub const SCAN_BASE_SCORE: u32 = 20;

/// Scan score when the scanner cannot produce a report.
pub const SCANNER_UNAVAILABLE_SCORE: u32 = 10;

/// Computes the static-scan score: 20 minus 10/5/2/1 per critical/high/medium/low finding.
pub fn scan_score(counts: &SeverityCounts) -> u32 {
    let penalty = counts
        .critical
        .saturating_mul(10)
        .saturating_add(counts.high.saturating_mul(5))
        .saturating_add(counts.medium.saturating_mul(2))
        .saturating_add(counts.low);
    SCAN_BASE_SCORE.saturating_sub(penalty)
}

/// Scores a skill's security from its reputation and a static scan.
pub struct SecurityAnalyzer {
    reputation: Box<dyn ReputationSource>,
    scanner: Box<dyn StaticScanner>,
}

impl SecurityAnalyzer {
    /// Creates a security analyzer from its two data sources.
    pub fn new(reputation: Box<dyn ReputationSource>, scanner: Box<dyn StaticScanner>) -> Self {
        Self {
            reputation,
            scanner,
        }
    }
}

impl Analyzer for SecurityAnalyzer {
    type Details = SecurityDetails;

    fn category(&self) -> Category {
        Category::Security
    }

    fn analyze<'a>(&'a self, target: &'a Target) -> AnalyzerFuture<'a, SecurityDetails> {
        Box::pin(async move {
            let (reputation, scan) = futures::join!(
                self.reputation.lookup(&target.name),
                self.scanner.scan(&target.path),
            );

            let mut details = SecurityDetails::default();

            match reputation {
                Ok(tier) => details.reputation = tier,
                Err(e) => {
                    warn!(skill = %target.name, error = %e, "Reputation lookup failed");
                    details.reputation = ReputationTier::Unknown;
                    details.reputation_error = Some(format!("{e:#}"));
                }
            }
            details.reputation_score = details.reputation.points();

            match scan {
                Ok(report) => {
                    details.scanner_available = true;
                    details.findings = report.severity_counts();
                    details.scan_score = scan_score(&details.findings);
                    details.raw_findings = report.findings;
                }
                Err(e) => {
                    warn!(path = %target.path.display(), error = %e, "Static scan unavailable");
                    details.scanner_available = false;
                    details.scan_score = SCANNER_UNAVAILABLE_SCORE;
                    details.scan_error = Some(format!("{e:#}"));
                }
            }

            let score = details.reputation_score + details.scan_score;
            debug!(
                reputation = %details.reputation,
                reputation_score = details.reputation_score,
                scan_score = details.scan_score,
                "Security analysis complete"
            );

            Ok(ScoreComponent::new(Category::Security, score, details))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockReputation, MockScanner};
    use serde_json::json;

    fn target() -> Target {
        Target::new("weather", "/tmp/weather")
    }

    #[test]
    fn scan_score_deductions() {
        assert_eq!(scan_score(&SeverityCounts::default()), 20);
        let counts = SeverityCounts {
            critical: 0,
            high: 1,
            medium: 2,
            low: 3,
        };
        assert_eq!(scan_score(&counts), 20 - 5 - 4 - 3);
    }

    #[test]
    fn scan_score_floors_at_zero() {
        let counts = SeverityCounts {
            critical: 3,
            ..Default::default()
        };
        assert_eq!(scan_score(&counts), 0);

        let huge = SeverityCounts {
            critical: u32::MAX,
            high: u32::MAX,
            medium: u32::MAX,
            low: u32::MAX,
        };
        assert_eq!(scan_score(&huge), 0);
    }

    #[tokio::test]
    async fn benign_and_clean_scores_full_marks() {
        let analyzer = SecurityAnalyzer::new(
            Box::new(MockReputation::new(vec![Ok(ReputationTier::Benign)])),
            Box::new(MockScanner::with_findings(vec![])),
        );
        let component = analyzer.analyze(&target()).await.unwrap();
        assert_eq!(component.score, 40);
        assert!(component.details.scanner_available);
    }

    #[tokio::test]
    async fn both_sources_failing_falls_back_to_twenty() {
        let analyzer = SecurityAnalyzer::new(
            Box::new(MockReputation::new(vec![Err(anyhow::anyhow!("connection refused"))])),
            Box::new(MockScanner::failing("No such file or directory")),
        );
        let component = analyzer.analyze(&target()).await.unwrap();
        assert_eq!(component.score, 20);
        assert_eq!(component.details.reputation, ReputationTier::Unknown);
        assert_eq!(component.details.reputation_score, 10);
        assert_eq!(component.details.scan_score, 10);
        assert!(!component.details.scanner_available);
        assert!(component
            .details
            .reputation_error
            .as_deref()
            .unwrap()
            .contains("connection refused"));
        assert!(component.details.scan_error.is_some());
    }

    #[tokio::test]
    async fn malicious_with_findings() {
        let analyzer = SecurityAnalyzer::new(
            Box::new(MockReputation::new(vec![Ok(ReputationTier::Malicious)])),
            Box::new(MockScanner::with_findings(vec![
                json!({"severity": "critical", "rule": "exfil"}),
                json!({"severity": "high"}),
            ])),
        );
        let component = analyzer.analyze(&target()).await.unwrap();
        assert_eq!(component.details.reputation_score, 0);
        assert_eq!(component.details.scan_score, 5);
        assert_eq!(component.score, 5);
        assert_eq!(component.details.findings.critical, 1);
        assert_eq!(component.details.findings.high, 1);
        assert_eq!(component.details.raw_findings.len(), 2);
    }

    #[tokio::test]
    async fn looks_up_target_name() {
        let reputation = MockReputation::new(vec![Ok(ReputationTier::Unknown)]);
        let lookups = reputation.lookup_handle();
        let analyzer = SecurityAnalyzer::new(
            Box::new(reputation),
            Box::new(MockScanner::with_findings(vec![])),
        );
        analyzer.analyze(&target()).await.unwrap();
        assert_eq!(*lookups.lock().unwrap(), vec!["weather".to_string()]);
    }
}
