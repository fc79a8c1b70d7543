use super::{Issue, IssueKind, PathSegment};
use serde_json::Value;

/// Cross-field checks that the sanitized schema can no longer express.
pub fn business_rule_errors(doc: &Value) -> Vec<Issue> {
    let Some(map) = doc.as_object() else {
        return vec![Issue {
            kind: IssueKind::BusinessRule,
            path: Vec::new(),
            message: "document root must be a mapping (use indentation to express structure)"
                .to_string(),
        }];
    };

    let rid = map.get("id").filter(|v| !v.is_null());
    let mid = map
        .get("meta")
        .and_then(Value::as_object)
        .and_then(|m| m.get("run_id"))
        .filter(|v| !v.is_null());

    match (rid, mid) {
        (Some(rid), Some(mid)) if rid != mid => vec![Issue {
            kind: IssueKind::BusinessRule,
            path: vec![
                PathSegment::Key("meta".into()),
                PathSegment::Key("run_id".into()),
            ],
            message: format!("$.meta.run_id must equal $.id (got meta.run_id={mid}, id={rid})"),
        }],
        _ => Vec::new(),
    }
}
