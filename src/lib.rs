//! # skill-scorecard
//!
//! Quality and safety scoring for skill packages.
//!
//! ## Features
//!
//! - Four independent analyzers: security, documentation, code quality and maintenance
//! - Concurrent aggregation that survives individual analyzer failures
//! - Letter grades and prioritized remediation advice
//!
//! ## Quick Start
//!
//! ```no_run
//! use skill_scorecard::{config::ScorerConfig, Scorer};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let scorer = Scorer::new(&ScorerConfig::default());
//! let result = scorer.score("./skills/weather".as_ref(), None).await?;
//! println!("{} scored {} ({})", result.skill, result.overall_score, result.grade);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod analyzers;
pub mod cli;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod git;
pub mod recommendations;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use crate::cli::Cli;
pub use crate::engine::Scorer;

/// The current version of skill-scorecard.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
