//! Evaluation orchestration around an external scoring collaborator.
//!
//! This module builds test cases from a requirement corpus, drives an
//! [`Evaluator`] under a concurrency limit and serializes the outcome. The
//! scoring itself is out of process.

pub mod case;
pub mod evaluator;
pub mod runner;

pub use case::{cases_from_markdown, cases_from_records, OVERALL_ID};
pub use evaluator::{CommandEvaluator, Evaluator, MetricScore};
pub use runner::EvalRunner;

use crate::errors::{ReqError, ReqResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// A metric the collaborator is asked to score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub name: String,
    /// Minimum score for the metric to count as a success.
    pub threshold: f64,
}

impl MetricSpec {
    pub fn new(name: impl Into<String>, threshold: f64) -> Self {
        Self {
            name: name.into(),
            threshold,
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("hallucination", 0.5),
            Self::new("faithfulness", 0.5),
            Self::new("planning_alignment", 0.5),
            Self::new("checklist_fit", 0.5),
            Self::new("overall_coverage", 0.5),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub actual_output: String,
    pub context: Vec<String>,
    pub retrieval_context: Vec<String>,
    pub additional_metadata: Value,
}

/// Outcome of one metric for one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricOutcome {
    pub name: String,
    pub score: Option<f64>,
    pub threshold: f64,
    pub success: bool,
    pub reason: Option<String>,
    pub evaluation_model: Option<String>,
    pub evaluation_cost: Option<f64>,
    /// Set when the collaborator failed for this metric.
    pub error: Option<String>,
}

impl MetricOutcome {
    pub fn scored(spec: &MetricSpec, score: MetricScore) -> Self {
        Self {
            name: spec.name.clone(),
            score: Some(score.score),
            threshold: spec.threshold,
            success: score.score >= spec.threshold,
            reason: score.reason,
            evaluation_model: score.evaluation_model,
            evaluation_cost: score.evaluation_cost,
            error: None,
        }
    }

    pub fn errored(spec: &MetricSpec, error: impl Into<String>) -> Self {
        Self {
            name: spec.name.clone(),
            score: None,
            threshold: spec.threshold,
            success: false,
            reason: None,
            evaluation_model: None,
            evaluation_cost: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub requirement_id: Option<String>,
    pub success: bool,
    pub input: String,
    pub actual_output: String,
    pub metrics: Vec<MetricOutcome>,
    pub additional_metadata: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

/// The evaluation-results artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResults {
    pub summary: ResultsSummary,
    pub test_results: Vec<TestResult>,
}

impl EvaluationResults {
    pub fn new(test_results: Vec<TestResult>) -> Self {
        let passed = test_results.iter().filter(|r| r.success).count();
        Self {
            summary: ResultsSummary {
                total: test_results.len(),
                passed,
                failed: test_results.len() - passed,
            },
            test_results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.summary.failed == 0
    }

    pub fn write_json(&self, out: &Path) -> ReqResult<()> {
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ReqError::io(parent, e))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(out, text).map_err(|e| ReqError::io(out, e))
    }
}
