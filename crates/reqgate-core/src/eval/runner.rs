use super::{EvaluationResults, Evaluator, MetricOutcome, MetricSpec, TestCase, TestResult};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Drives test cases through an [`Evaluator`].
///
/// At most `max_in_flight` cases are evaluated at once (default 1: the
/// collaborator is treated as rate limited). A failing metric is recorded on
/// its own outcome and never aborts sibling metrics or cases.
pub struct EvalRunner {
    evaluator: Arc<dyn Evaluator>,
    metrics: Arc<[MetricSpec]>,
    max_in_flight: usize,
}

impl EvalRunner {
    pub fn new(evaluator: Arc<dyn Evaluator>, metrics: Vec<MetricSpec>) -> Self {
        Self {
            evaluator,
            metrics: metrics.into(),
            max_in_flight: 1,
        }
    }

    pub fn with_max_in_flight(mut self, n: usize) -> Self {
        self.max_in_flight = n.max(1);
        self
    }

    /// Evaluate `cases`; results keep the input order.
    pub async fn run(&self, cases: Vec<TestCase>) -> anyhow::Result<EvaluationResults> {
        let sem = Arc::new(Semaphore::new(self.max_in_flight));
        let mut join_set = JoinSet::new();
        let total = cases.len();
        tracing::info!(
            cases = total,
            metrics = self.metrics.len(),
            max_in_flight = self.max_in_flight,
            evaluator = self.evaluator.name(),
            "starting evaluation"
        );

        for (idx, case) in cases.into_iter().enumerate() {
            let permit = sem.clone().acquire_owned().await?;
            let evaluator = self.evaluator.clone();
            let metrics = self.metrics.clone();
            join_set.spawn(async move {
                let _permit = permit;
                (idx, evaluate_case(evaluator.as_ref(), &metrics, case).await)
            });
        }

        let mut rows: Vec<(usize, TestResult)> = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            rows.push(joined?);
        }
        rows.sort_by_key(|(idx, _)| *idx);

        let results = EvaluationResults::new(rows.into_iter().map(|(_, r)| r).collect());
        tracing::info!(
            passed = results.summary.passed,
            failed = results.summary.failed,
            "evaluation finished"
        );
        Ok(results)
    }
}

async fn evaluate_case(evaluator: &dyn Evaluator, metrics: &[MetricSpec], case: TestCase) -> TestResult {
    let mut outcomes = Vec::with_capacity(metrics.len());
    for spec in metrics {
        let outcome = match evaluator.measure(&case, spec).await {
            Ok(score) => MetricOutcome::scored(spec, score),
            Err(e) => {
                tracing::warn!(case = %case.name, metric = %spec.name, error = %e, "metric evaluation failed");
                MetricOutcome::errored(spec, format!("{e:#}"))
            }
        };
        outcomes.push(outcome);
    }

    let requirement_id = case
        .additional_metadata
        .get("requirement_id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| Some(case.name.clone()));

    TestResult {
        requirement_id,
        success: outcomes.iter().all(|m| m.success),
        input: case.input,
        actual_output: case.actual_output,
        metrics: outcomes,
        additional_metadata: case.additional_metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MetricScore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scores by metric name; `broken` always errors. Tracks peak concurrency.
    struct FakeEvaluator {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeEvaluator {
        fn new() -> Self {
            Self {
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Evaluator for FakeEvaluator {
        async fn measure(&self, case: &TestCase, metric: &MetricSpec) -> anyhow::Result<MetricScore> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);

            match metric.name.as_str() {
                "broken" => anyhow::bail!("judge unavailable"),
                _ if case.name == "FR-002" => Ok(MetricScore::new(0.2)),
                _ => Ok(MetricScore::new(0.9).with_reason("fine")),
            }
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn case(id: &str) -> TestCase {
        TestCase {
            name: id.into(),
            input: format!("input {id}"),
            actual_output: format!("output {id}"),
            context: vec![],
            retrieval_context: vec![],
            additional_metadata: json!({ "requirement_id": id }),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn default_runs_one_case_at_a_time_in_order() {
        let fake = Arc::new(FakeEvaluator::new());
        let runner = EvalRunner::new(fake.clone(), vec![MetricSpec::new("faithfulness", 0.5)]);
        let results = runner
            .run(vec![case("FR-001"), case("FR-002"), case("FR-003")])
            .await
            .unwrap();

        assert_eq!(fake.peak.load(Ordering::SeqCst), 1);
        let ids: Vec<_> = results
            .test_results
            .iter()
            .map(|r| r.requirement_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["FR-001", "FR-002", "FR-003"]);
        assert_eq!(results.summary.passed, 2);
        assert_eq!(results.summary.failed, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn limit_bounds_parallelism() {
        let fake = Arc::new(FakeEvaluator::new());
        let runner = EvalRunner::new(fake.clone(), vec![MetricSpec::new("m", 0.5)]).with_max_in_flight(2);
        let cases = (1..=6).map(|i| case(&format!("FR-10{i}"))).collect();
        runner.run(cases).await.unwrap();
        assert!(fake.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn metric_error_is_isolated() {
        let runner = EvalRunner::new(
            Arc::new(FakeEvaluator::new()),
            vec![MetricSpec::new("broken", 0.5), MetricSpec::new("faithfulness", 0.5)],
        );
        let results = runner.run(vec![case("FR-001"), case("FR-003")]).await.unwrap();
        assert_eq!(results.summary.total, 2);

        let first = &results.test_results[0];
        assert!(!first.success);
        assert_eq!(first.metrics[0].error.as_deref(), Some("judge unavailable"));
        assert!(first.metrics[0].score.is_none());
        assert!(first.metrics[1].success);
        assert_eq!(first.metrics[1].reason.as_deref(), Some("fine"));
    }
}
