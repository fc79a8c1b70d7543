use reqgate_core::config::path_resolver::PathResolver;
use reqgate_core::stamp::{stamp_file, ContentHasher, ScriptHasher, Sha256Hasher, StampOptions};

use crate::cli::args::StampArgs;
use crate::exit_codes;

pub fn run(args: StampArgs) -> anyhow::Result<i32> {
    let project = args.project.load()?;

    let hasher: Box<dyn ContentHasher> = if args.builtin_sha256 {
        Box::new(Sha256Hasher)
    } else {
        // An explicit script is taken relative to the working directory.
        let script = match &args.hash_script {
            Some(p) => PathResolver::new(".").require("--hash-script", p)?,
            None => project
                .resolver
                .require("--hash-script", &project.config.hash_script)?,
        };
        Box::new(ScriptHasher::new(script))
    };

    let opts = StampOptions {
        model: args
            .model
            .clone()
            .unwrap_or_else(|| project.config.model.clone()),
        timestamp: None,
    };
    let file = std::path::absolute(&args.file).unwrap_or_else(|_| args.file.clone());
    stamp_file(&file, &args.prompt_id, hasher.as_ref(), &opts)?;

    println!("Stamped meta into: {}", file.display());
    Ok(exit_codes::OK)
}
