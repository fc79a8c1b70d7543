use reqgate_core::report::{write_dashboard, Verdict};

use crate::cli::args::DashboardArgs;
use crate::exit_codes;

pub fn run(args: DashboardArgs) -> anyhow::Result<i32> {
    let project = args.project.load()?;
    let cfg = &project.config;
    let input = project.resolver.require(
        "evaluation results",
        args.input.as_ref().unwrap_or(&cfg.eval_output),
    )?;
    let output = project
        .resolver
        .resolve(args.output.as_ref().unwrap_or(&cfg.dashboard_output));

    let report = write_dashboard(&input, &output)?;
    let failing = report
        .test_cases
        .iter()
        .filter(|r| r.summary.verdict == Verdict::Fail)
        .count();
    println!("Saved: {}", output.display());
    println!("{} cases, {} failing", report.test_cases.len(), failing);
    Ok(exit_codes::OK)
}
