//! Two-phase provenance stamping of a YAML requirement file.
//!
//! The digest has to cover the stamped document including its own `meta`
//! block. The file is first written with `output_hash: PENDING`, hashed, then
//! written again with the digest in place. A hashing failure leaves the first
//! write on disk, detectable by the placeholder.

pub mod hasher;

pub use hasher::{sha256_hex_bytes, ContentHasher, ScriptHasher, Sha256Hasher};

use crate::config::DEFAULT_MODEL;
use crate::errors::{ReqError, ReqResult};
use crate::requirement::corpus::file_stem;
use crate::requirement::{Meta, META_KEYS, PENDING_HASH, TIMESTAMP_FORMAT};
use serde_yaml::{Mapping, Value};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct StampOptions {
    pub model: String,
    /// Overrides the wall-clock timestamp.
    pub timestamp: Option<String>,
}

impl Default for StampOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timestamp: None,
        }
    }
}

/// Stamp `path` with fresh meta and return the verified result.
///
/// Re-stamping overwrites every meta key; no previous stamp is retained.
pub fn stamp_file(
    path: &Path,
    prompt_id: &str,
    hasher: &dyn ContentHasher,
    opts: &StampOptions,
) -> ReqResult<Meta> {
    if !path.is_file() {
        return Err(ReqError::InputNotFound {
            label: "--file".into(),
            requested: path.display().to_string(),
            resolved: std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
        });
    }
    let prompt_id = prompt_id.trim();
    if prompt_id.is_empty() {
        return Err(ReqError::Config("prompt id must not be empty".into()));
    }

    let mut doc = load_mapping(path)?;
    let run_id = file_stem(path);
    let timestamp = opts
        .timestamp
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format(TIMESTAMP_FORMAT).to_string());

    match doc.get_mut("meta") {
        Some(Value::Mapping(_)) => {}
        Some(slot) => *slot = Value::Mapping(Mapping::new()),
        None => {
            doc.insert("meta".into(), Value::Mapping(Mapping::new()));
        }
    }
    set_meta(&mut doc, "run_id", run_id.clone().into());
    set_meta(&mut doc, "prompt_id", prompt_id.into());
    set_meta(&mut doc, "timestamp", timestamp.into());
    set_meta(&mut doc, "model", opts.model.clone().into());
    set_meta(&mut doc, "output_hash", PENDING_HASH.into());

    write_yaml(path, &doc)?;
    tracing::debug!(file = %path.display(), "wrote stamp with pending hash");

    let digest = hasher.digest(path).inspect_err(|e| {
        tracing::warn!(file = %path.display(), hasher = %hasher.describe(), error = %e, "hashing failed; output_hash left pending");
    })?;
    set_meta(&mut doc, "output_hash", digest.into());
    write_yaml(path, &doc)?;
    tracing::info!(file = %path.display(), run_id = %run_id, prompt_id = %prompt_id, "stamped");

    verify_stamp(path, &run_id, prompt_id)
}

/// Reload `path` and check the five meta keys and the expected ids.
pub fn verify_stamp(path: &Path, expected_run_id: &str, expected_prompt_id: &str) -> ReqResult<Meta> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ReqError::postcondition(path, format!("stamped file could not be re-read: {e}")))?;
    let doc: Value = serde_yaml::from_str(&raw)
        .map_err(|e| ReqError::postcondition(path, format!("stamped file does not parse as YAML: {e}")))?;
    let Value::Mapping(doc) = doc else {
        return Err(ReqError::postcondition(path, "YAML root must be a mapping"));
    };
    let Some(Value::Mapping(meta)) = doc.get("meta") else {
        return Err(ReqError::postcondition(path, "meta is missing after stamping"));
    };

    let missing: Vec<&str> = META_KEYS
        .iter()
        .copied()
        .filter(|k| !meta.contains_key(*k))
        .collect();
    if !missing.is_empty() {
        return Err(ReqError::postcondition(
            path,
            format!("meta missing keys after stamping: {missing:?}"),
        ));
    }

    let field = |key: &str| -> ReqResult<String> {
        match meta.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            other => Err(ReqError::postcondition(
                path,
                format!("meta.{key} is not a string: {other:?}"),
            )),
        }
    };
    let stamped = Meta {
        run_id: field("run_id")?,
        prompt_id: field("prompt_id")?,
        timestamp: field("timestamp")?,
        model: field("model")?,
        output_hash: field("output_hash")?,
    };

    if stamped.run_id != expected_run_id {
        return Err(ReqError::postcondition(
            path,
            format!("meta.run_id mismatch: {} != {}", stamped.run_id, expected_run_id),
        ));
    }
    if stamped.prompt_id != expected_prompt_id {
        return Err(ReqError::postcondition(
            path,
            format!(
                "meta.prompt_id mismatch: {} != {}",
                stamped.prompt_id, expected_prompt_id
            ),
        ));
    }
    Ok(stamped)
}

fn load_mapping(path: &Path) -> ReqResult<Mapping> {
    let raw = std::fs::read_to_string(path).map_err(|e| ReqError::io(path, e))?;
    let doc: Value = serde_yaml::from_str(&raw)
        .map_err(|e| ReqError::parse(path.display().to_string(), e.to_string()))?;
    match doc {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ReqError::parse(
            path.display().to_string(),
            "YAML root must be a mapping",
        )),
    }
}

/// Existing keys keep their position, new keys are appended.
fn set_meta(doc: &mut Mapping, key: &str, value: Value) {
    if let Some(Value::Mapping(meta)) = doc.get_mut("meta") {
        meta.insert(key.into(), value);
    }
}

fn write_yaml(path: &Path, doc: &Mapping) -> ReqResult<()> {
    let text = serde_yaml::to_string(doc)?;
    std::fs::write(path, text).map_err(|e| ReqError::io(path, e))
}
