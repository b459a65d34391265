pub const INVALID_INPUT: &str = "invalid_input";
pub const UNKNOWN_TOOL: &str = "unknown_tool";
pub const PROCESS_FAILED: &str = "process_failed";
pub const TIMED_OUT: &str = "timed_out";
pub const ARTIFACT_MISSING: &str = "artifact_missing";
pub const INVALID_OUTPUT: &str = "invalid_output";
pub const INTERNAL_ERROR: &str = "internal_error";
