//! Analyzer contract and the four category analyzers.

pub mod code_quality;
pub mod documentation;
pub mod maintenance;
pub mod reputation;
pub mod scanner;
pub mod security;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::Result;
use futures::FutureExt;
use tracing::warn;

use crate::data::{Category, ComponentDetails, ScoreComponent};

pub use code_quality::CodeQualityAnalyzer;
pub use documentation::DocumentationAnalyzer;
pub use maintenance::MaintenanceAnalyzer;
pub use reputation::{HttpReputationClient, ReputationSource};
pub use scanner::{ExternalScanner, ScanReport, StaticScanner};
pub use security::SecurityAnalyzer;

/// The skill being rated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Name used for reputation lookup and display.
    pub name: String,
    /// Resolved skill directory.
    pub path: PathBuf,
}

impl Target {
    /// Creates a target.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Boxed future returned by [`Analyzer::analyze`].
pub type AnalyzerFuture<'a, D> = Pin<Box<dyn Future<Output = Result<ScoreComponent<D>>> + Send + 'a>>;

/// A scoring probe for one category.
///
/// Implementations encode expected failures (missing files, unreachable
/// services, absent tools) as a degraded component with `details.error` set,
/// and keep the score within the category ceiling. An `Err` is reserved for
/// failures outside that contract; [`Isolated`] turns those into a zero score.
pub trait Analyzer: Send + Sync {
    /// Sub-findings produced by this analyzer.
    type Details: ComponentDetails;

    /// Category this analyzer scores.
    fn category(&self) -> Category;

    /// Analyzes the target.
    fn analyze<'a>(&'a self, target: &'a Target) -> AnalyzerFuture<'a, Self::Details>;
}

impl<A: Analyzer + ?Sized> Analyzer for Box<A> {
    type Details = A::Details;

    fn category(&self) -> Category {
        (**self).category()
    }

    fn analyze<'a>(&'a self, target: &'a Target) -> AnalyzerFuture<'a, Self::Details> {
        (**self).analyze(target)
    }
}

/// Wraps an analyzer so that it never fails.
pub fn isolate<A: Analyzer>(analyzer: A) -> Isolated<A> {
    Isolated { inner: analyzer }
}

/// An analyzer whose errors and panics degrade to a zero-score component.
pub struct Isolated<A> {
    inner: A,
}

impl<A: Analyzer> Isolated<A> {
    /// Runs the wrapped analyzer, substituting a failed component on error or panic.
    pub async fn run(&self, target: &Target) -> ScoreComponent<A::Details> {
        let category = self.inner.category();

        match AssertUnwindSafe(self.inner.analyze(target))
            .catch_unwind()
            .await
        {
            Ok(Ok(component)) => ScoreComponent::new(category, component.score, component.details),
            Ok(Err(e)) => {
                warn!(category = %category, error = %e, "Analyzer failed");
                ScoreComponent::failed(category, format!("{e:#}"))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(category = %category, panic = %message, "Analyzer panicked");
                ScoreComponent::failed(category, format!("analyzer panicked: {message}"))
            }
        }
    }

    /// Returns the wrapped analyzer.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: Analyzer> Analyzer for Isolated<A> {
    type Details = A::Details;

    fn category(&self) -> Category {
        self.inner.category()
    }

    fn analyze<'a>(&'a self, target: &'a Target) -> AnalyzerFuture<'a, Self::Details> {
        Box::pin(async move { Ok(self.run(target).await) })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
