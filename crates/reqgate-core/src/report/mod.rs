//! Dashboard artifact produced from evaluation results.

pub mod dashboard;

pub use dashboard::{
    normalize_record, normalize_results, summarize, CaseSummary, DashboardMetric,
    DashboardRecord, DashboardReport, PayloadShape, Verdict, MAX_FINDINGS,
    PRESENTATION_THRESHOLD,
};

use crate::errors::{ReqError, ReqResult};
use serde_json::Value;
use std::path::Path;

/// Read a results payload of any known shape.
pub fn load_results(path: &Path) -> ReqResult<Value> {
    let text = std::fs::read_to_string(path).map_err(|e| ReqError::io(path, e))?;
    serde_json::from_str(&text)
        .map_err(|e| ReqError::parse(path.display().to_string(), e.to_string()))
}

/// Normalize the payload at `input` and write the dashboard to `output`.
pub fn write_dashboard(input: &Path, output: &Path) -> ReqResult<DashboardReport> {
    let report = normalize_results(&load_results(input)?);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ReqError::io(parent, e))?;
    }
    let text = serde_json::to_string_pretty(&report)?;
    std::fs::write(output, text).map_err(|e| ReqError::io(output, e))?;
    tracing::info!(
        records = report.test_cases.len(),
        output = %output.display(),
        "dashboard written"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_normalized_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("eval.json");
        let output = dir.path().join("out/results.json");
        std::fs::write(
            &input,
            r#"{"test_results": [{"requirement_id": "FR-001", "metrics": [{"name": "m", "score": 0.3}]}]}"#,
        )
        .unwrap();

        let report = write_dashboard(&input, &output).unwrap();
        assert_eq!(report.test_cases[0].summary.verdict, Verdict::Fail);

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["testCases"][0]["summary"]["findings"][0], "m below threshold (0.30)");
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("eval.json");
        std::fs::write(&input, "{ nope").unwrap();
        let err = write_dashboard(&input, &dir.path().join("o.json")).unwrap_err();
        assert!(matches!(err, ReqError::Parse { .. }));
    }
}
