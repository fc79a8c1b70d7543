use super::TestCase;
use crate::canonical::canonicalize;
use crate::requirement::{Record, RequirementCorpus};
use serde_json::{json, Value};

/// Identifier of the whole-corpus coverage case.
pub const OVERALL_ID: &str = "OVERALL";

fn requirement_input(planning: &str, checklist: &str, id: &str, text: &str) -> String {
    format!(
        "[Planning]\n{planning}\n\n[Checklist]\n{checklist}\n\n[Requirement ID] {id}\n[Requirement]\n{text}\n"
    )
}

fn requirement_case(planning: &str, checklist: &str, id: &str, text: String, metadata: Value) -> TestCase {
    TestCase {
        name: id.to_string(),
        input: requirement_input(planning, checklist, id, &text),
        actual_output: text,
        context: vec![planning.to_string()],
        retrieval_context: vec![planning.to_string()],
        additional_metadata: metadata,
    }
}

fn overall_case<'a>(planning: &str, texts: impl Iterator<Item = &'a str>) -> TestCase {
    let all = texts
        .map(|t| format!("---\n{t}"))
        .collect::<Vec<_>>()
        .join("\n\n");
    TestCase {
        name: OVERALL_ID.to_string(),
        input: format!("[Planning]\n{planning}\n\n[All Requirements]\n{all}\n"),
        actual_output: all,
        context: vec![planning.to_string()],
        retrieval_context: vec![planning.to_string()],
        additional_metadata: json!({ "requirement_id": OVERALL_ID }),
    }
}

/// One case per segmented Markdown block, then the overall case.
pub fn cases_from_markdown(
    corpus: &RequirementCorpus<String>,
    planning: &str,
    checklist: &str,
) -> Vec<TestCase> {
    let mut cases: Vec<TestCase> = corpus
        .iter()
        .map(|(id, block)| {
            requirement_case(
                planning,
                checklist,
                id,
                block.clone(),
                json!({ "requirement_id": id }),
            )
        })
        .collect();
    cases.push(overall_case(planning, corpus.values().map(String::as_str)));
    cases
}

/// One case per YAML record (canonical text), then the overall case.
pub fn cases_from_records(
    corpus: &RequirementCorpus<Record>,
    planning: &str,
    checklist: &str,
) -> Vec<TestCase> {
    let texts: Vec<(&str, String)> = corpus
        .iter()
        .map(|(id, record)| (id, canonicalize(record)))
        .collect();

    let mut cases: Vec<TestCase> = texts
        .iter()
        .map(|(id, text)| {
            let meta = corpus
                .get(id)
                .and_then(|r| r.get("meta"))
                .filter(|m| m.is_object())
                .cloned()
                .unwrap_or_else(|| json!({}));
            requirement_case(
                planning,
                checklist,
                id,
                text.clone(),
                json!({ "requirement_id": id, "meta": meta }),
            )
        })
        .collect();
    cases.push(overall_case(planning, texts.iter().map(|(_, t)| t.as_str())));
    cases
}
