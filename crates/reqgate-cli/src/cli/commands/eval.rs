use reqgate_core::eval::{cases_from_markdown, cases_from_records, CommandEvaluator, EvalRunner};
use reqgate_core::requirement::load_yaml_dir;
use reqgate_core::segment_markdown;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::args::{EvalArgs, EvalSource};
use crate::exit_codes;

pub async fn run(args: EvalArgs) -> anyhow::Result<i32> {
    let project = args.project.load()?;
    let (cfg, resolver) = (&project.config, &project.resolver);

    let planning = resolver.read_text("planning document", &cfg.planning)?;
    let checklist = resolver.read_text("checklist", &cfg.checklist)?;

    let cases = match args.source {
        EvalSource::Markdown => {
            let md = resolver.read_text(
                "requirements markdown",
                args.input.as_ref().unwrap_or(&cfg.requirements_md),
            )?;
            cases_from_markdown(&segment_markdown(&md)?, &planning, &checklist)
        }
        EvalSource::Yaml => {
            let dir = resolver.require(
                "requirements directory",
                args.input.as_ref().unwrap_or(&cfg.requirements_dir),
            )?;
            cases_from_records(&load_yaml_dir(&dir)?, &planning, &checklist)
        }
    };

    let evaluator = CommandEvaluator::from_command_line(&args.evaluator_cmd)?
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let runner = EvalRunner::new(Arc::new(evaluator), cfg.metrics.clone())
        .with_max_in_flight(args.max_in_flight.unwrap_or(cfg.max_in_flight));
    let results = runner.run(cases).await?;

    let out = resolver.resolve(args.output.as_ref().unwrap_or(&cfg.eval_output));
    results.write_json(&out)?;
    println!("Saved: {}", out.display());
    println!(
        "{} passed, {} failed of {}",
        results.summary.passed, results.summary.failed, results.summary.total
    );

    Ok(if results.all_passed() {
        exit_codes::OK
    } else {
        exit_codes::CHECK_FAILED
    })
}
