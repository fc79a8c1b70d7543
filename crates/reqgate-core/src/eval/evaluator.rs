use super::{MetricSpec, TestCase};
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Score returned by the collaborator for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    pub score: f64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub evaluation_model: Option<String>,
    #[serde(default)]
    pub evaluation_cost: Option<f64>,
}

impl MetricScore {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            reason: None,
            evaluation_model: None,
            evaluation_cost: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// External scoring collaborator.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn measure(&self, case: &TestCase, metric: &MetricSpec) -> anyhow::Result<MetricScore>;

    fn name(&self) -> &str;
}

#[derive(Serialize)]
struct MeasureRequest<'a> {
    case: &'a TestCase,
    metric: &'a MetricSpec,
}

/// Runs an external program once per (case, metric).
///
/// The request `{"case": ..., "metric": ...}` is written to stdin; stdout must
/// hold a single JSON [`MetricScore`].
#[derive(Debug, Clone)]
pub struct CommandEvaluator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandEvaluator {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Split a command line on whitespace.
    ///
    /// No shell quoting is applied: a program or argument containing spaces
    /// must go through [`CommandEvaluator::new`] instead.
    pub fn from_command_line(cmdline: &str) -> anyhow::Result<Self> {
        let mut parts = cmdline.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("evaluator command is empty"))?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Evaluator for CommandEvaluator {
    async fn measure(&self, case: &TestCase, metric: &MetricSpec) -> anyhow::Result<MetricScore> {
        let request = serde_json::to_vec(&MeasureRequest { case, metric })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn evaluator {}", self.program))?;

        // The request is written while output is collected, both under one
        // deadline; a child that never drains stdin must not outlive it.
        let stdin = child.stdin.take();
        let write_request = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            stdin.write_all(&request).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::time::timeout(self.timeout, async {
            tokio::join!(write_request, child.wait_with_output())
        })
        .await
        .map_err(|_| anyhow!("evaluator timed out after {:?}", self.timeout))?;
        let output = output.context("failed to collect evaluator output")?;
        match written {
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                return Err(e).context("failed to write evaluator request");
            }
            _ => {}
        }

        if !output.status.success() {
            bail!(
                "evaluator exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        serde_json::from_slice(&output.stdout).with_context(|| {
            format!(
                "evaluator output is not a metric score: {}",
                String::from_utf8_lossy(&output.stdout).trim()
            )
        })
    }

    fn name(&self) -> &str {
        &self.program
    }
}
