//! Exit codes of `reqgate`. Part of the public contract for unattended use.

pub const OK: i32 = 0;
pub const CHECK_FAILED: i32 = 1; // validation or evaluation did not pass
pub const CONFIG_ERROR: i32 = 2; // missing input, bad config, unparsable document
pub const HASH_TOOL_FAILED: i32 = 3;
pub const POSTCONDITION_FAILED: i32 = 4; // stamped file did not read back as written
