#![allow(deprecated)] // cargo_bin is deprecated but still supported by assert_cmd
//! Exit-code and output-line contract of the `reqgate` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../schemas/requirements.schema.json"
));

const FR_001: &str = "\
id: FR-001
type: functional
title: Login
what: Sign in with email and password.
acceptance_criteria:
  - Valid credentials open the dashboard.
";

fn reqgate() -> Command {
    let mut cmd = Command::cargo_bin("reqgate").expect("reqgate binary");
    cmd.env_remove("RUST_LOG")
        .env_remove("REQGATE_CONFIG")
        .env_remove("REQGATE_EVALUATOR_CMD");
    cmd
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(path, content).expect("write fixture");
}

/// Project with a config, the sample schema and an empty requirements dir.
fn project() -> TempDir {
    let dir = tempdir().unwrap();
    write(
        &dir.path().join("reqgate.yaml"),
        "version: 1\nrequirements_dir: requirements\nschema: schema.json\n",
    );
    write(&dir.path().join("schema.json"), SCHEMA);
    fs::create_dir_all(dir.path().join("requirements")).unwrap();
    dir
}

#[test]
fn validate_reports_each_file_and_fails_on_mismatch() {
    let dir = project();
    write(&dir.path().join("requirements/FR-001.yaml"), FR_001);
    write(
        &dir.path().join("requirements/FR-002.yaml"),
        &(FR_001
            .replace("FR-001", "FR-002")
            .replace("title: Login", "title: Logout")
            + "meta:\n  run_id: FR-009\n  prompt_id: PR-001\n  timestamp: 2026-03-01 08:00\n  model: gpt-5.2\n  output_hash: PENDING\n"),
    );

    reqgate()
        .args(["validate", "--root"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✅ FR-001.yaml"))
        .stdout(predicate::str::contains("❌ FR-002.yaml"))
        .stdout(predicate::str::contains(
            "  - $.meta.run_id must equal $.id (got meta.run_id=\"FR-009\", id=\"FR-002\")",
        ));

    fs::remove_file(dir.path().join("requirements/FR-002.yaml")).unwrap();
    reqgate()
        .args(["validate", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ FR-001.yaml"));
}

#[test]
fn validate_json_lists_schema_paths() {
    let dir = project();
    write(
        &dir.path().join("requirements/AR-001.yaml"),
        "id: AR-001\ntype: architectural\ntitle: Layers\nwhat: Split layers.\nacceptance_criteria: [ok, 3]\n",
    );

    let output = reqgate()
        .args(["validate", "--format", "json", "--root"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["accepted"], false);
    assert_eq!(v["files"][0]["file"], "AR-001.yaml");
    assert_eq!(v["files"][0]["issues"][0]["path"], "$.acceptance_criteria[1]");
}

#[test]
fn validate_without_targets_is_not_a_failure() {
    let dir = project();
    write(&dir.path().join("requirements/readme.yaml"), "x: 1\n");
    reqgate()
        .args(["validate", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No requirement files"));
}

#[test]
fn validate_missing_schema_is_config_error() {
    let dir = project();
    fs::remove_file(dir.path().join("schema.json")).unwrap();
    reqgate()
        .args(["validate", "--root"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("schema not found"))
        .stderr(predicate::str::contains("requested: schema.json"));
}

#[test]
fn named_config_that_does_not_exist_is_config_error() {
    let dir = project();
    reqgate()
        .args(["validate", "--config", "custom.yaml", "--root"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn stamp_with_builtin_hasher_writes_meta() {
    let dir = project();
    let file = dir.path().join("requirements/FR-001.yaml");
    write(&file, FR_001);

    reqgate()
        .args(["stamp", "--builtin-sha256", "--prompt-id", " PR-004 ", "--model", "judge-1", "--root"])
        .arg(dir.path())
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stamped meta into:"))
        .stdout(predicate::str::contains("FR-001.yaml"));

    let doc: serde_yaml::Value = serde_yaml::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(doc["meta"]["run_id"].as_str(), Some("FR-001"));
    assert_eq!(doc["meta"]["prompt_id"].as_str(), Some("PR-004"));
    assert_eq!(doc["meta"]["model"].as_str(), Some("judge-1"));
    assert_eq!(doc["meta"]["output_hash"].as_str().map(str::len), Some(64));

    reqgate()
        .args(["validate", "--root"])
        .arg(dir.path())
        .assert()
        .success();
}

#[test]
fn stamp_missing_file_is_config_error() {
    let dir = project();
    reqgate()
        .args(["stamp", "--builtin-sha256", "--prompt-id", "PR-001", "--file"])
        .arg(dir.path().join("requirements/FR-404.yaml"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--file not found"));
}

#[cfg(unix)]
#[test]
fn stamp_hash_tool_failure_leaves_pending() {
    let dir = project();
    let file = dir.path().join("requirements/FR-001.yaml");
    write(&file, FR_001);
    let script = dir.path().join("hash.sh");
    write(&script, "echo boom >&2\nexit 1\n");

    reqgate()
        .args(["stamp", "--prompt-id", "PR-001", "--file"])
        .arg(&file)
        .arg("--hash-script")
        .arg(&script)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("boom"));

    assert!(fs::read_to_string(&file).unwrap().contains("output_hash: PENDING"));
}

#[test]
fn segment_prints_blocks_in_document_order() {
    let dir = project();
    let md = dir.path().join("req.md");
    write(&md, "intro\n\nID: FR-002\nSecond first\n\nID: FR-001\nThen first\n");

    let output = reqgate()
        .args(["segment", "--root"])
        .arg(dir.path())
        .arg("--input")
        .arg("req.md")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let second = stdout.find("FR-002").unwrap();
    let first = stdout.find("FR-001").unwrap();
    assert!(second < first);
    assert!(!stdout.contains("intro"));
}

#[test]
fn segment_without_anchors_is_parse_error() {
    let dir = project();
    write(&dir.path().join("req.md"), "# nothing here\n");
    reqgate()
        .args(["segment", "--input", "req.md", "--root"])
        .arg(dir.path())
        .assert()
        .code(2);
}

#[test]
fn canonicalize_prints_projection() {
    let dir = project();
    let file = dir.path().join("FR-001.yaml");
    write(&file, FR_001);
    reqgate()
        .arg("canonicalize")
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID: FR-001\n\nType: functional"))
        .stdout(predicate::str::contains("Exceptions:\n- (none)"));
}

#[cfg(unix)]
#[test]
fn eval_then_dashboard() {
    let dir = project();
    write(&dir.path().join("requirements/FR-001.yaml"), FR_001);
    write(&dir.path().join("planning/planning.md"), "Plan: login first.\n");
    write(&dir.path().join("checklist/checklist_requirements.md"), "- testable\n");
    write(
        &dir.path().join("judge.sh"),
        "cat >/dev/null\necho '{\"score\": 0.65, \"reason\": \"ok\"}'\n",
    );
    let judge = format!("sh {}", dir.path().join("judge.sh").display());

    reqgate()
        .args(["eval", "--evaluator-cmd", &judge, "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved:"))
        .stdout(predicate::str::contains("2 passed, 0 failed of 2"));

    let eval_out = dir.path().join("deepeval/output/eval_requirements.json");
    let results: serde_json::Value = serde_json::from_str(&fs::read_to_string(&eval_out).unwrap()).unwrap();
    assert_eq!(results["test_results"][0]["requirement_id"], "FR-001");
    assert_eq!(results["test_results"][1]["requirement_id"], "OVERALL");

    reqgate()
        .args(["dashboard", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 cases, 2 failing"));

    let dash: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("deepeval/output/results.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(dash["testCases"][0]["name"], "FR-001");
    assert_eq!(dash["testCases"][0]["summary"]["verdict"], "FAIL");
    assert_eq!(dash["testCases"][0]["metrics"].as_array().unwrap().len(), 5);
}

#[test]
fn dashboard_missing_input_is_config_error() {
    let dir = project();
    reqgate()
        .args(["dashboard", "--root"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("evaluation results not found"));
}
