use crate::errors::{ReqError, ReqResult};
use std::path::{Path, PathBuf};

/// Resolves project-relative paths against an explicit root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root is the directory holding the config file.
    pub fn for_config_file(config_path: &Path) -> Self {
        let root = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, p: impl AsRef<Path>) -> PathBuf {
        let p = p.as_ref();
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Resolve and require existence.
    pub fn require(&self, label: &str, p: impl AsRef<Path>) -> ReqResult<PathBuf> {
        let requested = p.as_ref();
        let resolved = self.resolve(requested);
        if !resolved.exists() {
            return Err(ReqError::InputNotFound {
                label: label.to_string(),
                requested: requested.display().to_string(),
                resolved,
            });
        }
        Ok(resolved)
    }

    pub fn read_text(&self, label: &str, p: impl AsRef<Path>) -> ReqResult<String> {
        let path = self.require(label, p)?;
        std::fs::read_to_string(&path).map_err(|e| ReqError::io(path, e))
    }

    /// Resolve an output path, creating its parent directory.
    pub fn ensure_parent_dir(&self, p: impl AsRef<Path>) -> ReqResult<PathBuf> {
        let path = self.resolve(p);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ReqError::io(parent, e))?;
        }
        Ok(path)
    }
}
