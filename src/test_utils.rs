//! Shared test doubles for analyzers and their external data sources.

use std::collections::VecDeque;
use std::future::Future;
use std::marker::PhantomData;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;

use crate::analyzers::{Analyzer, AnalyzerFuture, ReputationSource, ScanReport, StaticScanner, Target};
use crate::data::{Category, ComponentDetails, ReputationTier, ScoreComponent};

/// What a [`MockAnalyzer`] does when invoked.
#[derive(Clone, Debug)]
pub(crate) enum MockBehavior {
    /// Returns a component with this score (clamped).
    Score(u32),
    /// Returns a component with this score, bypassing the clamp.
    RawScore(u32),
    /// Returns `Err` with this message.
    Fail(String),
    /// Panics with this message.
    Panic(String),
    /// Sleeps, then returns a component with this score.
    Delayed(Duration, u32),
}

/// Analyzer with pre-programmed behavior that counts its invocations.
pub(crate) struct MockAnalyzer<D> {
    category: Category,
    behavior: MockBehavior,
    calls: Arc<AtomicUsize>,
    _details: PhantomData<fn() -> D>,
}

impl<D> MockAnalyzer<D> {
    /// Creates a mock analyzer for a category.
    pub(crate) fn new(category: Category, behavior: MockBehavior) -> Self {
        Self {
            category,
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            _details: PhantomData,
        }
    }

    /// Returns a handle counting how often `analyze` was called.
    pub(crate) fn call_handle(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl<D: ComponentDetails> Analyzer for MockAnalyzer<D> {
    type Details = D;

    fn category(&self) -> Category {
        self.category
    }

    fn analyze<'a>(&'a self, _target: &'a Target) -> AnalyzerFuture<'a, D> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let category = self.category;
        let behavior = self.behavior.clone();
        Box::pin(async move {
            match behavior {
                MockBehavior::Score(score) => Ok(ScoreComponent::new(category, score, D::default())),
                MockBehavior::RawScore(score) => Ok(ScoreComponent {
                    score,
                    max: category.max(),
                    details: D::default(),
                    failed: false,
                }),
                MockBehavior::Fail(message) => Err(anyhow::anyhow!(message)),
                MockBehavior::Panic(message) => panic!("{message}"),
                MockBehavior::Delayed(delay, score) => {
                    tokio::time::sleep(delay).await;
                    Ok(ScoreComponent::new(category, score, D::default()))
                }
            }
        })
    }
}

/// Reputation source returning queued answers in FIFO order.
///
/// When the queue is exhausted, lookups fail with `"no more mock responses"`.
pub(crate) struct MockReputation {
    responses: Arc<Mutex<VecDeque<Result<ReputationTier>>>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockReputation {
    /// Creates a mock returning the given answers in order.
    pub(crate) fn new(responses: Vec<Result<ReputationTier>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a shared handle to the names that were looked up.
    pub(crate) fn lookup_handle(&self) -> Arc<Mutex<Vec<String>>> {
        self.lookups.clone()
    }
}

impl ReputationSource for MockReputation {
    fn lookup<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ReputationTier>> + Send + 'a>> {
        Box::pin(async move {
            self.lookups.lock().unwrap().push(name.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no more mock responses")))
        })
    }
}

/// Static scanner returning a fixed outcome.
pub(crate) struct MockScanner {
    outcome: std::result::Result<Vec<serde_json::Value>, String>,
}

impl MockScanner {
    /// Scanner that reports the given findings.
    pub(crate) fn with_findings(findings: Vec<serde_json::Value>) -> Self {
        Self { outcome: Ok(findings) }
    }

    /// Scanner that fails with the given message.
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
        }
    }
}

impl StaticScanner for MockScanner {
    fn scan<'a>(
        &'a self,
        _path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<ScanReport>> + Send + 'a>> {
        Box::pin(async move {
            match &self.outcome {
                Ok(findings) => Ok(ScanReport {
                    findings: findings.clone(),
                }),
                Err(message) => Err(anyhow::anyhow!(message.clone())),
            }
        })
    }
}
