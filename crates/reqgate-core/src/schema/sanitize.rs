//! Removal of the `$data` reference extension from a JSON Schema.
//!
//! `{"const": {"$data": "1/id"}}` compares against another field's runtime
//! value. Standard draft validators do not understand it, so every `allOf`
//! member that nests such a `const` is dropped before compilation. The
//! cross-field equality it expressed is re-checked by
//! [`super::rules::business_rule_errors`].

use serde_json::Value;

/// Key marking a runtime value reference inside `const`.
pub const DATA_REF_KEY: &str = "$data";

/// Return a sanitized copy of `schema`; the input is left untouched.
pub fn sanitize_schema(schema: &Value) -> Value {
    let mut copy = schema.clone();
    strip_data_const_members(&mut copy);
    copy
}

fn strip_data_const_members(node: &mut Value) {
    match node {
        Value::Object(map) => {
            let mut drop_all_of = false;
            if let Some(Value::Array(members)) = map.get_mut("allOf") {
                let before = members.len();
                members.retain(|m| !contains_data_const(m));
                if members.len() != before {
                    tracing::debug!(removed = before - members.len(), "stripped $data allOf members");
                }
                drop_all_of = members.is_empty();
            }
            if drop_all_of {
                map.remove("allOf");
            }
            for child in map.values_mut() {
                strip_data_const_members(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_data_const_members(item);
            }
        }
        _ => {}
    }
}

/// True if `node` anywhere holds `const: {"$data": ...}`.
pub fn contains_data_const(node: &Value) -> bool {
    match node {
        Value::Object(map) => map.iter().any(|(k, v)| {
            (k == "const" && v.as_object().is_some_and(|c| c.contains_key(DATA_REF_KEY)))
                || contains_data_const(v)
        }),
        Value::Array(items) => items.iter().any(contains_data_const),
        _ => false,
    }
}
