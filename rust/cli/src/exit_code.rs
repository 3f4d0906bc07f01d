//! Exit code constants for the CLI application.

/// Success exit code (standard Unix convention).
pub const SUCCESS: i32 = 0;

/// Invalid input, an engine refusal, a failed verification or a
/// configuration error.
pub const ERROR: i32 = 2;
