use reqgate_core::canonicalize;
use reqgate_core::config::path_resolver::PathResolver;
use reqgate_core::requirement::load_record;

use crate::cli::args::CanonicalizeArgs;
use crate::exit_codes;

pub fn run(args: CanonicalizeArgs) -> anyhow::Result<i32> {
    let path = PathResolver::new(".").require("--file", &args.file)?;
    let record = load_record(&path)?;
    println!("{}", canonicalize(&record));
    Ok(exit_codes::OK)
}
