use reqgate_core::segment_markdown;

use crate::cli::args::SegmentArgs;
use crate::exit_codes;

pub fn run(args: SegmentArgs) -> anyhow::Result<i32> {
    let project = args.project.load()?;
    let md = project.resolver.read_text(
        "requirements markdown",
        args.input.as_ref().unwrap_or(&project.config.requirements_md),
    )?;
    let corpus = segment_markdown(&md)?;
    println!("{}", serde_json::to_string_pretty(&corpus)?);
    Ok(exit_codes::OK)
}
