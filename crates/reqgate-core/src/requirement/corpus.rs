use super::id::{is_requirement_file_name, RequirementId};
use crate::errors::{ReqError, ReqResult};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// A structured requirement record as parsed from YAML.
pub type Record = Map<String, Value>;

/// Ordered id → requirement mapping.
///
/// Order is first-insertion order. Re-inserting an existing id replaces the
/// value but keeps the original position.
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementCorpus<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for RequirementCorpus<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> RequirementCorpus<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the replaced value when `id` was already present.
    pub fn insert(&mut self, id: impl Into<String>, value: T) -> Option<T> {
        let id = id.into();
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((id, value));
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<T> IntoIterator for RequirementCorpus<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Serializes as a map in corpus order.
impl<T: Serialize> Serialize for RequirementCorpus<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, value) in &self.entries {
            map.serialize_entry(id, value)?;
        }
        map.end()
    }
}

/// Requirement files in `dir`, sorted by file name.
pub fn requirement_files(dir: &Path) -> ReqResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| ReqError::io(dir, e))? {
        let entry = entry.map_err(|e| ReqError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_requirement_file_name(&name) {
            out.push(path);
        } else if name.ends_with(".yaml") || name.ends_with(".yml") {
            tracing::debug!(file = %name, "skipping non-requirement yaml");
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

/// Parse one YAML requirement file; the root must be a mapping.
pub fn load_record(path: &Path) -> ReqResult<Record> {
    let raw = std::fs::read_to_string(path).map_err(|e| ReqError::io(path, e))?;
    let value: Value = serde_yaml::from_str(&raw)
        .map_err(|e| ReqError::parse(path.display().to_string(), e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ReqError::parse(
            path.display().to_string(),
            "YAML root must be a mapping",
        )),
    }
}

/// Load every requirement file of `dir`, keyed by record `id` (file stem when absent).
pub fn load_yaml_dir(dir: &Path) -> ReqResult<RequirementCorpus<Record>> {
    if !dir.is_dir() {
        return Err(ReqError::InputNotFound {
            label: "requirements dir".into(),
            requested: dir.display().to_string(),
            resolved: dir.to_path_buf(),
        });
    }

    let targets = requirement_files(dir)?;
    if targets.is_empty() {
        let mut visible: Vec<String> = std::fs::read_dir(dir)
            .map_err(|e| ReqError::io(dir, e))?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".yaml") || n.ends_with(".yml"))
            .collect();
        visible.sort();
        let visible = if visible.is_empty() {
            "(none)".to_string()
        } else {
            visible.join(", ")
        };
        return Err(ReqError::parse(
            dir.display().to_string(),
            format!("no requirement YAMLs found; YAML files visible: {visible}"),
        ));
    }

    let mut corpus = RequirementCorpus::new();
    for path in targets {
        let record = load_record(&path)?;
        let id = match record.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(v) if !v.is_null() && !matches!(v, Value::String(_)) => v.to_string(),
            _ => file_stem(&path),
        };
        match RequirementId::parse(&id) {
            Some(rid) => tracing::debug!(id = %rid, kind = ?rid.kind(), "loaded requirement record"),
            None => tracing::warn!(id = %id, file = %path.display(), "record id is not of the form XX-NNN"),
        }
        if corpus.insert(id.clone(), record).is_some() {
            tracing::warn!(id = %id, file = %path.display(), "duplicate requirement id, last file wins");
        }
    }
    Ok(corpus)
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
