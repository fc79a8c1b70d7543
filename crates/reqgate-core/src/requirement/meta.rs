use serde::{Deserialize, Serialize};

/// Keys every stamped `meta` block must carry.
pub const META_KEYS: [&str; 5] = ["run_id", "prompt_id", "timestamp", "model", "output_hash"];

/// Value held in `meta.output_hash` between the two stamping writes.
pub const PENDING_HASH: &str = "PENDING";

/// Minute-resolution timestamp format used in `meta.timestamp`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Provenance block embedded in a requirement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub run_id: String,
    pub prompt_id: String,
    pub timestamp: String,
    pub model: String,
    pub output_hash: String,
}

impl Meta {
    pub fn is_pending(&self) -> bool {
        self.output_hash == PENDING_HASH
    }
}
