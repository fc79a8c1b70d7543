//! Schema gating for YAML requirement files.
//!
//! Validation collects every error (no fail-fast) and aggregates per file so
//! the whole batch can be reported before an exit signal is decided.

pub mod rules;
pub mod sanitize;

pub use rules::business_rule_errors;
pub use sanitize::{contains_data_const, sanitize_schema, DATA_REF_KEY};

use crate::errors::{ReqError, ReqResult};
use crate::requirement::requirement_files;
use jsonschema::Draft;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// One step of an instance path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Schema,
    BusinessRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Issue {
    /// `$.meta.run_id`, `$.acceptance_criteria[0]`, `$` for the root.
    pub fn json_path(&self) -> String {
        render_path(&self.path)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::Schema => write!(f, "{}: {}", self.json_path(), self.message),
            IssueKind::BusinessRule => f.write_str(&self.message),
        }
    }
}

pub fn render_path(path: &[PathSegment]) -> String {
    let mut out = String::from("$");
    for seg in path {
        match seg {
            PathSegment::Key(k) => {
                out.push('.');
                out.push_str(k);
            }
            PathSegment::Index(i) => out.push_str(&format!("[{i}]")),
        }
    }
    out
}

/// Validator compiled from a sanitized schema.
pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    /// Sanitize `raw_schema` and compile it as Draft 2020-12.
    pub fn new(raw_schema: &Value) -> ReqResult<Self> {
        let schema = sanitize_schema(raw_schema);
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|e| ReqError::SchemaCompile(e.to_string()))?;
        Ok(Self { validator })
    }

    pub fn from_file(path: &Path) -> ReqResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ReqError::io(path, e))?;
        let schema: Value = serde_json::from_str(&raw)
            .map_err(|e| ReqError::parse(path.display().to_string(), e.to_string()))?;
        Self::new(&schema)
    }

    /// All schema errors for `instance`, sorted by path.
    pub fn schema_errors(&self, instance: &Value) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self
            .validator
            .iter_errors(instance)
            .map(|e| Issue {
                kind: IssueKind::Schema,
                path: pointer_segments(instance, &e.instance_path.to_string()),
                message: e.to_string(),
            })
            .collect();
        issues.sort_by(|a, b| a.path.cmp(&b.path));
        issues
    }

    /// Schema errors followed by business-rule errors.
    pub fn check(&self, instance: &Value) -> Vec<Issue> {
        let mut issues = self.schema_errors(instance);
        issues.extend(business_rule_errors(instance));
        issues
    }

    pub fn check_file(&self, path: &Path) -> ReqResult<FileOutcome> {
        let raw = std::fs::read_to_string(path).map_err(|e| ReqError::io(path, e))?;
        let issues = match serde_yaml::from_str::<Value>(&raw) {
            Ok(doc) => self.check(&doc),
            Err(e) => vec![Issue {
                kind: IssueKind::Schema,
                path: Vec::new(),
                message: format!("YAML parse error: {e}"),
            }],
        };
        Ok(FileOutcome {
            file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            issues,
        })
    }
}

/// Split a JSON pointer into segments, using `instance` to tell array indices
/// from object keys.
fn pointer_segments(instance: &Value, pointer: &str) -> Vec<PathSegment> {
    let mut out = Vec::new();
    let mut cur = Some(instance);
    for raw in pointer.split('/').skip(1) {
        let token = raw.replace("~1", "/").replace("~0", "~");
        match (cur, token.parse::<usize>()) {
            (Some(Value::Array(items)), Ok(idx)) => {
                cur = items.get(idx);
                out.push(PathSegment::Index(idx));
            }
            (node, _) => {
                cur = node.and_then(|n| n.get(&token));
                out.push(PathSegment::Key(token));
            }
        }
    }
    out
}

/// Validation outcome of a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub path: PathBuf,
    pub issues: Vec<Issue>,
}

impl FileOutcome {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn schema_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.kind == IssueKind::Schema)
    }

    pub fn rule_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.kind == IssueKind::BusinessRule)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub files: Vec<FileOutcome>,
}

impl ValidationReport {
    /// True only if every targeted file is fully valid.
    pub fn accepted(&self) -> bool {
        self.files.iter().all(FileOutcome::is_valid)
    }

    pub fn invalid_count(&self) -> usize {
        self.files.iter().filter(|f| !f.is_valid()).count()
    }
}

/// Validate every `(FR|AR)-NNN.ya?ml` file in `dir`.
pub fn validate_dir(validator: &SchemaValidator, dir: &Path) -> ReqResult<ValidationReport> {
    let mut report = ValidationReport::default();
    for path in requirement_files(dir)? {
        let outcome = validator.check_file(&path)?;
        if !outcome.is_valid() {
            tracing::debug!(file = %outcome.file, issues = outcome.issues.len(), "requirement file invalid");
        }
        report.files.push(outcome);
    }
    Ok(report)
}
