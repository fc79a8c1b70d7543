//! Requirement-document pipeline: segmentation, canonical rendering, schema
//! gating, provenance stamping, evaluation and dashboard normalization.

pub mod canonical;
pub mod config;
pub mod errors;
pub mod eval;
pub mod report;
pub mod requirement;
pub mod schema;
pub mod segment;
pub mod stamp;

pub use canonical::canonicalize;
pub use errors::{ReqError, ReqResult};
pub use segment::segment_markdown;
