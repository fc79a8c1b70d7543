//! Normalization of evaluation-result payloads into the dashboard shape.
//!
//! Result payloads drift between collaborator versions. The payload is first
//! classified into one of the known shapes, then every logical field is read
//! through an ordered list of lookup paths; the first present value wins and each
//! field has a fixed terminal default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Presentation cutoff. Independent of each metric's own threshold.
pub const PRESENTATION_THRESHOLD: f64 = 0.70;

/// Maximum number of failing-metric descriptions per record.
pub const MAX_FINDINGS: usize = 8;

/// Keys that may hold the record list in a mapping payload, in lookup order.
pub const CONTAINER_KEYS: [&str; 3] = ["test_results", "results", "testCases"];

type KeyPath = &'static [&'static str];

const INPUT_PATHS: &[KeyPath] = &[&["test_case", "input"], &["input"]];
const OUTPUT_PATHS: &[KeyPath] = &[&["test_case", "actual_output"], &["actual_output"]];
const METADATA_PATHS: &[KeyPath] = &[
    &["test_case", "additional_metadata"],
    &["additional_metadata"],
];
const TOP_LEVEL_ID_PATHS: &[KeyPath] = &[&["requirement_id"], &["id"]];
const METRIC_LIST_PATHS: &[KeyPath] = &[&["metrics_data"], &["metrics"]];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub verdict: Verdict,
    pub findings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetric {
    pub name: String,
    pub score: f64,
    pub weight: f64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DashboardMetric {
    pub fn fails(&self) -> bool {
        self.score < PRESENTATION_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRecord {
    pub name: String,
    pub input: String,
    pub actual_output: String,
    pub summary: CaseSummary,
    pub metrics: Vec<DashboardMetric>,
}

/// The dashboard artifact handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub test_cases: Vec<DashboardRecord>,
}

/// Known payload shapes.
#[derive(Debug, PartialEq)]
pub enum PayloadShape<'a> {
    /// A bare sequence of records.
    Sequence(&'a [Value]),
    /// A mapping holding a non-empty sequence under one of [`CONTAINER_KEYS`].
    /// Empty sequences are skipped like absent keys.
    Container { key: &'static str, records: &'a [Value] },
    /// Anything else stands for a single record.
    Single(&'a Value),
}

impl<'a> PayloadShape<'a> {
    pub fn classify(payload: &'a Value) -> Self {
        match payload {
            Value::Array(items) => Self::Sequence(items),
            Value::Object(map) => CONTAINER_KEYS
                .iter()
                .find_map(|key| match map.get(*key) {
                    Some(Value::Array(items)) if !items.is_empty() => Some(Self::Container {
                        key: *key,
                        records: items,
                    }),
                    _ => None,
                })
                .unwrap_or(Self::Single(payload)),
            _ => Self::Single(payload),
        }
    }

    pub fn records(&self) -> &'a [Value] {
        match self {
            Self::Sequence(items) | Self::Container { records: items, .. } => *items,
            Self::Single(v) => std::slice::from_ref(*v),
        }
    }
}

fn at_path<'v>(value: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(value, |cur, key| cur.as_object()?.get(*key))
}

/// First non-null value among `paths`.
fn lookup<'v>(value: &'v Value, paths: &[KeyPath]) -> Option<&'v Value> {
    paths
        .iter()
        .find_map(|p| at_path(value, p).filter(|v| !v.is_null()))
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Non-empty identifier text, if any.
fn id_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers, numeric strings and booleans coerce; anything else is `None`.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn first_non_empty_str(m: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match m.get(*k) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Some(v.to_string()),
        _ => None,
    })
}

fn normalize_metric(raw: &Value) -> Option<DashboardMetric> {
    let m = raw.as_object()?;
    let score = m
        .get("score")
        .filter(|v| !v.is_null())
        .or_else(|| m.get("value"))
        .and_then(coerce_number)
        .unwrap_or(0.0);
    Some(DashboardMetric {
        name: first_non_empty_str(m, &["name", "metric"]).unwrap_or_else(|| "Metric".to_string()),
        score,
        weight: m.get("weight").and_then(coerce_number).unwrap_or(1.0),
        reason: first_non_empty_str(m, &["reason", "explanation"]).unwrap_or_default(),
        threshold: m.get("threshold").and_then(coerce_number),
        error: m.get("error").filter(|v| !v.is_null()).map(|v| text_of(Some(v))),
    })
}

pub fn summarize(metrics: &[DashboardMetric]) -> CaseSummary {
    let failing: Vec<&DashboardMetric> = metrics.iter().filter(|m| m.fails()).collect();
    CaseSummary {
        verdict: if failing.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail
        },
        findings: failing
            .iter()
            .take(MAX_FINDINGS)
            .map(|m| format!("{} below threshold ({:.2})", m.name, m.score))
            .collect(),
    }
}

/// Normalize one record; `position` is 1-based and feeds the placeholder id.
pub fn normalize_record(record: &Value, position: usize) -> DashboardRecord {
    let metadata = lookup(record, METADATA_PATHS);
    let name = metadata
        .and_then(|m| {
            id_of(at_path(m, &["requirement_id"])).or_else(|| id_of(at_path(m, &["id"])))
        })
        .or_else(|| {
            TOP_LEVEL_ID_PATHS
                .iter()
                .find_map(|p| id_of(at_path(record, p)))
        })
        .unwrap_or_else(|| {
            let placeholder = format!("TC-{position:03}");
            tracing::debug!(placeholder = %placeholder, "no identifier in result record");
            placeholder
        });

    let metrics: Vec<DashboardMetric> = lookup(record, METRIC_LIST_PATHS)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_metric).collect())
        .unwrap_or_default();

    DashboardRecord {
        name,
        input: text_of(lookup(record, INPUT_PATHS)),
        actual_output: text_of(lookup(record, OUTPUT_PATHS)),
        summary: summarize(&metrics),
        metrics,
    }
}

/// Normalize an evaluation-result payload of any known shape.
pub fn normalize_results(payload: &Value) -> DashboardReport {
    let shape = PayloadShape::classify(payload);
    if let PayloadShape::Single(_) = shape {
        tracing::debug!("result payload has no record list, treating it as one record");
    }
    DashboardReport {
        test_cases: shape
            .records()
            .iter()
            .enumerate()
            .map(|(idx, r)| normalize_record(r, idx + 1))
            .collect(),
    }
}
