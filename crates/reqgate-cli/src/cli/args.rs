use clap::{Args, Parser, Subcommand, ValueEnum};
use reqgate_core::config::{load_project, Project};
use reqgate_core::ReqResult;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "reqgate",
    version,
    about = "Requirement documents: segment, validate, stamp, evaluate and report"
)]
pub struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate requirement YAML files against the schema and business rules
    Validate(ValidateArgs),
    /// Write provenance meta and a content hash into a requirement file
    Stamp(StampArgs),
    /// Split a Markdown requirements document into blocks by ID
    Segment(SegmentArgs),
    /// Print the canonical text of a YAML requirement record
    Canonicalize(CanonicalizeArgs),
    /// Evaluate requirements through an external scoring command
    Eval(EvalArgs),
    /// Normalize evaluation results into the dashboard shape
    Dashboard(DashboardArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Config file; defaults to an optional reqgate.yaml in the project root
    #[arg(long, env = "REQGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Project root; defaults to the directory holding the config file
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl ProjectArgs {
    /// A relative `--config` is looked up under `--root` when both are given.
    pub fn load(&self) -> ReqResult<Project> {
        load_project(self.config.as_deref(), self.root.as_deref())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValidateOutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Directory holding FR-NNN.yaml / AR-NNN.yaml files
    #[arg(long)]
    pub dir: Option<PathBuf>,

    #[arg(long)]
    pub schema: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ValidateOutputFormat::Text)]
    pub format: ValidateOutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct StampArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Requirement file, e.g. requirements/FR-001.yaml
    #[arg(long)]
    pub file: PathBuf,

    /// Prompt identifier, e.g. PR-003
    #[arg(long)]
    pub prompt_id: String,

    /// Hashing script; defaults to `hash_script` from the config
    #[arg(long, conflicts_with = "builtin_sha256")]
    pub hash_script: Option<PathBuf>,

    /// Hash in-process with SHA-256 instead of running a script
    #[arg(long)]
    pub builtin_sha256: bool,

    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SegmentArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Markdown document; defaults to `requirements_md` from the config
    #[arg(long)]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CanonicalizeArgs {
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EvalSource {
    Yaml,
    Markdown,
}

#[derive(Args, Debug, Clone)]
pub struct EvalArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Scoring command; receives one JSON request per (case, metric) on stdin
    #[arg(long, env = "REQGATE_EVALUATOR_CMD")]
    pub evaluator_cmd: String,

    #[arg(long, value_enum, default_value_t = EvalSource::Yaml)]
    pub source: EvalSource,

    /// Requirements directory (yaml) or document (markdown); defaults from the config
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Overrides `max_in_flight` from the config
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// Per-call timeout in seconds
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Evaluation results; defaults to `eval_output` from the config
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Defaults to `dashboard_output` from the config
    #[arg(long)]
    pub output: Option<PathBuf>,
}
