//! Error types for the requirement pipeline.

use std::path::PathBuf;

/// Pipeline errors.
///
/// Schema violations are not represented here: they are collected into a
/// [`crate::schema::ValidationReport`] so a whole batch can be reported at once.
#[derive(Debug, thiserror::Error)]
pub enum ReqError {
    /// A required input path does not exist.
    #[error("{label} not found:\n- requested: {requested}\n- resolved: {}", resolved.display())]
    InputNotFound {
        label: String,
        requested: String,
        resolved: PathBuf,
    },

    /// Input was readable but did not have the expected shape.
    #[error("parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// The external hashing tool failed or produced no digest.
    #[error("hash tool failed: {reason}\ncmd: {command}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    HashTool {
        command: String,
        stdout: String,
        stderr: String,
        reason: String,
    },

    /// A stamped document did not read back as expected.
    #[error("post-stamp verification failed for {}: {message}", path.display())]
    Postcondition { path: PathBuf, message: String },

    /// Project configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The schema document could not be compiled.
    #[error("schema compile error: {0}")]
    SchemaCompile(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ReqError {
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn postcondition(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Postcondition {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputNotFound { .. }
            | Self::Parse { .. }
            | Self::Config(_)
            | Self::SchemaCompile(_)
            | Self::Io { .. }
            | Self::Yaml(_)
            | Self::Json(_) => 2,
            Self::HashTool { .. } => 3,
            Self::Postcondition { .. } => 4,
        }
    }
}

/// Result type for pipeline operations.
pub type ReqResult<T> = Result<T, ReqError>;
