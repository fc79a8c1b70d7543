//! Requirement identifiers, provenance metadata and the ordered corpus.

pub mod corpus;
pub mod id;
pub mod meta;

pub use corpus::{load_record, load_yaml_dir, requirement_files, Record, RequirementCorpus};
pub use id::{is_requirement_file_name, RequirementId, RequirementKind};
pub use meta::{Meta, META_KEYS, PENDING_HASH, TIMESTAMP_FORMAT};

/// Semantic scalar fields of a YAML record, in canonical order.
pub const SCALAR_FIELDS: [(&str, &str); 6] = [
    ("id", "ID"),
    ("type", "Type"),
    ("title", "Title"),
    ("role", "Role"),
    ("what", "What"),
    ("why", "Why"),
];

/// List-valued fields of a YAML record, in canonical order.
pub const LIST_FIELDS: [(&str, &str); 9] = [
    ("acceptance_criteria", "Acceptance Criteria"),
    ("exceptions", "Exceptions"),
    ("logs", "Logs"),
    ("dependencies", "Dependencies"),
    ("permissions", "Permissions"),
    ("nfr", "NFR"),
    ("evidence", "Evidence"),
    ("changes_from_current", "Changes From Current"),
    ("tbd", "TBD"),
];
