//! Error types for analyzers and the scoring engine.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures inside an analyzer's external data sources.
///
/// Analyzers absorb these into a degraded score; they never reach the engine.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Reputation service answered with a non-success status.
    #[error("Reputation request failed: {0}")]
    ReputationRequestFailed(String),

    /// Response body could not be interpreted.
    #[error("Invalid response format: {0}")]
    InvalidResponseFormat(String),

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// External call exceeded its time budget.
    #[error("{operation} timed out after {}ms", .timeout.as_millis())]
    Timeout {
        /// What was being waited on.
        operation: &'static str,
        /// Budget that was exceeded.
        timeout: Duration,
    },

    /// Scanner executable could not be started.
    #[error("Scanner unavailable: {0}")]
    ScannerUnavailable(String),

    /// Scanner ran but did not produce a usable report.
    #[error("Scanner failed: {0}")]
    ScannerFailed(String),

    /// Captured scanner output exceeded the configured cap.
    #[error("Scanner output exceeded {limit} bytes")]
    OutputTooLarge {
        /// Configured cap in bytes.
        limit: usize,
    },
}

/// Failures visible to callers of the scoring engine.
#[derive(Error, Debug)]
pub enum ScoreError {
    /// Target path does not exist or cannot be resolved.
    #[error("Skill path not found: {}", .path.display())]
    TargetNotFound {
        /// Path as given by the caller.
        path: PathBuf,
        /// Underlying resolution error.
        #[source]
        source: std::io::Error,
    },

    /// Target path resolves to something other than a directory.
    #[error("Skill path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}
