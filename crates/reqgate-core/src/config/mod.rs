//! Project configuration (`reqgate.yaml`).
//!
//! Every field is optional; a missing config file yields the defaults with the
//! current directory as project root.

pub mod path_resolver;

use crate::errors::{ReqError, ReqResult};
use crate::eval::MetricSpec;
use path_resolver::PathResolver;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_CONFIG_FILE: &str = "reqgate.yaml";

/// Model identifier written into `meta.model` by the stamper.
pub const DEFAULT_MODEL: &str = "gpt-5.2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub version: u32,
    pub requirements_dir: PathBuf,
    pub schema: PathBuf,
    pub planning: PathBuf,
    pub checklist: PathBuf,
    pub requirements_md: PathBuf,
    pub eval_output: PathBuf,
    pub dashboard_output: PathBuf,
    pub hash_script: PathBuf,
    pub model: String,
    /// Upper bound on concurrent evaluator calls.
    pub max_in_flight: usize,
    pub metrics: Vec<MetricSpec>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            requirements_dir: PathBuf::from("requirements"),
            schema: PathBuf::from("requirements/JsonScheme/requirements.schema.json"),
            planning: PathBuf::from("planning/planning.md"),
            checklist: PathBuf::from("checklist/checklist_requirements.md"),
            requirements_md: PathBuf::from("outputs/PR-001/RUN-001.md"),
            eval_output: PathBuf::from("deepeval/output/eval_requirements.json"),
            dashboard_output: PathBuf::from("deepeval/output/results.json"),
            hash_script: PathBuf::from("hashtag/hashtag_generator.py"),
            model: DEFAULT_MODEL.to_string(),
            max_in_flight: 1,
            metrics: MetricSpec::defaults(),
        }
    }
}

/// A loaded configuration together with the root it resolves against.
#[derive(Debug, Clone)]
pub struct Project {
    pub config: ProjectConfig,
    pub resolver: PathResolver,
}

impl Project {
    pub fn new(config: ProjectConfig, resolver: PathResolver) -> Self {
        Self { config, resolver }
    }
}

pub fn load_config(path: &Path) -> ReqResult<ProjectConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| ReqError::io(path, e))?;
    let cfg: ProjectConfig = serde_yaml::from_str(&raw)
        .map_err(|e| ReqError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ReqError::Config(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    if cfg.max_in_flight == 0 {
        return Err(ReqError::Config("max_in_flight must be at least 1".into()));
    }
    Ok(cfg)
}

/// Load the project configuration.
///
/// Without `config_path` the default `reqgate.yaml` is looked up (under
/// `root_override` when given) and defaults apply if it is absent. A named
/// config file must exist; a relative one is taken under `root_override`.
/// `root_override` replaces the config directory as project root.
pub fn load_project(config_path: Option<&Path>, root_override: Option<&Path>) -> ReqResult<Project> {
    let under_root = |p: &Path| match root_override {
        Some(root) if p.is_relative() => root.join(p),
        _ => p.to_path_buf(),
    };

    let (path, config) = match config_path {
        Some(requested) => {
            let path = under_root(requested);
            if !path.is_file() {
                return Err(ReqError::InputNotFound {
                    label: "config file".into(),
                    requested: requested.display().to_string(),
                    resolved: path,
                });
            }
            let config = load_config(&path)?;
            (path, config)
        }
        None => {
            let path = under_root(Path::new(DEFAULT_CONFIG_FILE));
            let config = if path.exists() {
                load_config(&path)?
            } else {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                ProjectConfig::default()
            };
            (path, config)
        }
    };

    let resolver = match root_override {
        Some(root) => PathResolver::new(root),
        None => PathResolver::for_config_file(&path),
    };
    Ok(Project::new(config, resolver))
}
