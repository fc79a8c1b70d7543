use super::args::{Cli, Command};
use reqgate_core::ReqError;

pub mod canonicalize;
pub mod dashboard;
pub mod eval;
pub mod segment;
pub mod stamp;
pub mod validate;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let result = match cli.cmd {
        Command::Validate(args) => validate::run(args),
        Command::Stamp(args) => stamp::run(args),
        Command::Segment(args) => segment::run(args),
        Command::Canonicalize(args) => canonicalize::run(args),
        Command::Eval(args) => eval::run(args).await,
        Command::Dashboard(args) => dashboard::run(args),
    };
    exit_on_pipeline_error(result)
}

/// Pipeline errors are reported on stderr and mapped to their exit code.
/// Anything else escapes to `main`.
fn exit_on_pipeline_error(result: anyhow::Result<i32>) -> anyhow::Result<i32> {
    match result {
        Err(e) => match e.downcast_ref::<ReqError>() {
            Some(err) => {
                eprintln!("error: {err}");
                Ok(err.exit_code())
            }
            None => Err(e),
        },
        ok => ok,
    }
}
