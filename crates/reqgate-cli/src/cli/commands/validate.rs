use reqgate_core::schema::{validate_dir, FileOutcome, Issue, SchemaValidator, ValidationReport};
use serde_json::json;

use crate::cli::args::{ValidateArgs, ValidateOutputFormat};
use crate::exit_codes;

/// Issues printed per category for one file.
const MAX_LINES_PER_CATEGORY: usize = 20;

pub fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    let project = args.project.load()?;
    let cfg = &project.config;
    let schema_path = project
        .resolver
        .require("schema", args.schema.as_ref().unwrap_or(&cfg.schema))?;
    let dir = project.resolver.require(
        "requirements directory",
        args.dir.as_ref().unwrap_or(&cfg.requirements_dir),
    )?;

    let validator = SchemaValidator::from_file(&schema_path)?;
    let report = validate_dir(&validator, &dir)?;

    match args.format {
        ValidateOutputFormat::Text if report.files.is_empty() => {
            println!(
                "No requirement files in {} (expected names like FR-001.yaml)",
                dir.display()
            );
        }
        ValidateOutputFormat::Text => print_text(&report),
        ValidateOutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&build_json(&report))?);
        }
    }

    let exit_code = if report.accepted() {
        exit_codes::OK
    } else {
        exit_codes::CHECK_FAILED
    };
    tracing::debug!(files = report.files.len(), invalid = report.invalid_count(), exit_code, "validation done");
    Ok(exit_code)
}

fn print_text(report: &ValidationReport) {
    for file in &report.files {
        if file.is_valid() {
            println!("✅ {}", file.file);
            continue;
        }
        println!("❌ {}", file.file);
        print_issues(file.schema_issues());
        print_issues(file.rule_issues());
    }
}

fn print_issues<'a>(issues: impl Iterator<Item = &'a Issue>) {
    for issue in issues.take(MAX_LINES_PER_CATEGORY) {
        println!("  - {issue}");
    }
}

fn build_json(report: &ValidationReport) -> serde_json::Value {
    let files: Vec<_> = report.files.iter().map(file_json).collect();
    json!({
        "accepted": report.accepted(),
        "invalid": report.invalid_count(),
        "files": files,
    })
}

fn file_json(file: &FileOutcome) -> serde_json::Value {
    let issues: Vec<_> = file
        .issues
        .iter()
        .map(|i| json!({ "kind": i.kind, "path": i.json_path(), "message": i.message }))
        .collect();
    json!({ "file": file.file, "valid": file.is_valid(), "issues": issues })
}
