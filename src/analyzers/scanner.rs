//! External static scanner invocation.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info};

use crate::data::SeverityCounts;
use crate::error::AnalyzerError;

/// Cap on captured scanner stderr, used only for error messages.
const MAX_STDERR_BYTES: usize = 64 * 1024;

/// Performs deeper security analysis of a skill directory.
pub trait StaticScanner: Send + Sync {
    /// Scans the directory and returns its findings.
    fn scan<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<ScanReport>> + Send + 'a>>;
}

/// Parsed scanner output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Raw findings; each is expected to carry a `severity` field.
    pub findings: Vec<Value>,
}

impl ScanReport {
    /// Parses scanner JSON: either `{"findings": [...]}` or a bare array.
    pub fn parse(output: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(output)
            .map_err(|e| AnalyzerError::InvalidResponseFormat(format!("scanner output: {e}")))?;

        let findings = match value {
            Value::Array(findings) => findings,
            Value::Object(mut map) => match map.remove("findings") {
                Some(Value::Array(findings)) => findings,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(AnalyzerError::InvalidResponseFormat(format!(
                        "scanner 'findings' is not a list: {other}"
                    ))
                    .into())
                }
            },
            other => {
                return Err(AnalyzerError::InvalidResponseFormat(format!(
                    "unexpected scanner output: {other}"
                ))
                .into())
            }
        };

        Ok(Self { findings })
    }

    /// Counts findings per severity; unrecognized or missing severities count as low.
    pub fn severity_counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for finding in &self.findings {
            let severity = finding
                .get("severity")
                .and_then(Value::as_str)
                .map(str::to_lowercase);
            match severity.as_deref() {
                Some("critical") => counts.critical += 1,
                Some("high") => counts.high += 1,
                Some("medium") => counts.medium += 1,
                _ => counts.low += 1,
            }
        }
        counts
    }
}

/// Reads `reader` to EOF, keeping only the first `cap` bytes.
async fn read_head<R: AsyncRead + Unpin>(mut reader: R, cap: usize) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(head);
        }
        let room = cap.saturating_sub(head.len());
        head.extend_from_slice(&buf[..n.min(room)]);
    }
}

/// Runs a scanner executable and reads its JSON report from stdout.
pub struct ExternalScanner {
    executable: PathBuf,
    args: Vec<String>,
    timeout: Duration,
    max_output_bytes: usize,
}

impl ExternalScanner {
    /// Creates a scanner invoking `executable <args..> <path>`.
    pub fn new(
        executable: impl Into<PathBuf>,
        args: Vec<String>,
        timeout: Duration,
        max_output_bytes: usize,
    ) -> Self {
        Self {
            executable: executable.into(),
            args,
            timeout,
            max_output_bytes,
        }
    }

    async fn run(&self, path: &Path) -> Result<ScanReport> {
        let mut child = Command::new(&self.executable)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AnalyzerError::ScannerUnavailable(format!("{}: {e}", self.executable.display()))
            })?;

        let stdout = child.stdout.take().context("Scanner stdout not captured")?;
        let stderr = child.stderr.take().context("Scanner stderr not captured")?;

        // Both pipes are drained to EOF; a full pipe would stall the child.
        let limit = self.max_output_bytes;
        let (out_read, err_read) = tokio::join!(
            read_head(stdout, limit.saturating_add(1)),
            read_head(stderr, MAX_STDERR_BYTES),
        );
        let out = out_read.context("Failed to read scanner stdout")?;
        let err = err_read.context("Failed to read scanner stderr")?;

        if out.len() > limit {
            return Err(AnalyzerError::OutputTooLarge { limit }.into());
        }

        let status = child.wait().await.context("Failed to wait for scanner")?;
        debug!(
            status = %status,
            stdout_len = out.len(),
            stderr_len = err.len(),
            "Scanner exited"
        );

        if !status.success() {
            let stderr_text = String::from_utf8_lossy(&err);
            return Err(AnalyzerError::ScannerFailed(format!(
                "{} exited with {status}: {}",
                self.executable.display(),
                stderr_text.trim()
            ))
            .into());
        }

        ScanReport::parse(&out)
    }
}

impl StaticScanner for ExternalScanner {
    fn scan<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<ScanReport>> + Send + 'a>> {
        Box::pin(async move {
            info!(
                scanner = %self.executable.display(),
                path = %path.display(),
                "Running static scanner"
            );

            match tokio::time::timeout(self.timeout, self.run(path)).await {
                Ok(result) => result,
                Err(_) => Err(AnalyzerError::Timeout {
                    operation: "static scan",
                    timeout: self.timeout,
                }
                .into()),
            }
        })
    }
}
