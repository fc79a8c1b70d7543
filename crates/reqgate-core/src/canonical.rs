//! Deterministic text projection of a YAML requirement record.
//!
//! The projection feeds the evaluation collaborator, so it must not depend on
//! field order or formatting of the source file. Field-level type drift is
//! rendered as a sentinel line instead of failing the whole record.

use crate::requirement::{Record, LIST_FIELDS, SCALAR_FIELDS};
use serde_json::Value;

pub const NONE_SENTINEL: &str = "- (none)";

/// Render `record` into its canonical multi-line text.
pub fn canonicalize(record: &Record) -> String {
    let mut sections: Vec<String> = Vec::with_capacity(SCALAR_FIELDS.len() + LIST_FIELDS.len());

    for (key, label) in SCALAR_FIELDS {
        let value = record.get(key).map(scalar_text).unwrap_or_default();
        sections.push(format!("{label}: {value}"));
    }
    for (key, label) in LIST_FIELDS {
        sections.push(format!("{label}:\n{}", list_block(record.get(key))));
    }

    sections.join("\n\n").trim().to_string()
}

fn list_block(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NONE_SENTINEL.to_string(),
        Some(Value::Array(items)) if items.is_empty() => NONE_SENTINEL.to_string(),
        Some(Value::String(s)) if s.is_empty() => NONE_SENTINEL.to_string(),
        Some(Value::Object(m)) if m.is_empty() => NONE_SENTINEL.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| format!("- {}", scalar_text(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        Some(other) => format!("- (invalid type: {})", type_name(other)),
    }
}

/// Plain rendering of a YAML value: strings verbatim, containers as compact JSON.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(yaml: &str) -> Record {
        match serde_yaml::from_str::<Value>(yaml).unwrap() {
            Value::Object(m) => m,
            other => panic!("not a mapping: {other:?}"),
        }
    }

    #[test]
    fn renders_fields_in_fixed_order() {
        let r = record(
            "why: because\nid: FR-001\ntitle: Login\ntype: functional\nrole: user\nwhat: sign in\n\
             acceptance_criteria:\n  - shows form\n  - accepts sso\n",
        );
        let text = canonicalize(&r);
        assert!(text.starts_with(
            "ID: FR-001\n\nType: functional\n\nTitle: Login\n\nRole: user\n\nWhat: sign in\n\nWhy: because"
        ));
        assert!(text.contains("Acceptance Criteria:\n- shows form\n- accepts sso"));
        assert!(text.ends_with("TBD:\n- (none)"));
    }

    #[test]
    fn is_independent_of_source_field_order() {
        let a = record("id: FR-001\ntitle: T\nlogs: [a, b]\n");
        let b = record("logs: [a, b]\ntitle: T\nid: FR-001\n");
        assert_eq!(canonicalize(&a), canonicalize(&b));
        assert_eq!(canonicalize(&a), canonicalize(&a));
    }

    #[test]
    fn missing_list_renders_none_sentinel() {
        let text = canonicalize(&record("id: FR-001\n"));
        assert!(text.contains("Acceptance Criteria:\n- (none)"));
        assert!(text.contains("Why: \n\nAcceptance"));
    }

    #[test]
    fn wrong_list_type_renders_type_sentinel() {
        let text = canonicalize(&record("id: FR-001\nexceptions: timeout\nnfr: {latency: 200}\n"));
        assert!(text.contains("Exceptions:\n- (invalid type: string)"));
        assert!(text.contains("NFR:\n- (invalid type: mapping)"));
    }

    #[test]
    fn non_string_items_are_rendered_plainly() {
        let text = canonicalize(&record("id: FR-001\nevidence: [1, true, {k: v}]\n"));
        assert!(text.contains("Evidence:\n- 1\n- true\n- {\"k\":\"v\"}"));
    }
}
