//! Priority bands for set events. Higher wins.
//!
//! Only the ordering matters: metadata defaults < inline control code < input files <
//! values handed over by the runner.

pub const PROFILE_METADATA: i32 = 10;
pub const INLINE_CONTROL_CODE: i32 = 20;
pub const INPUT_FILE: i32 = 40;
pub const RUNNER_API: i32 = 50;

/// Effective priority of an event that carries none.
pub const UNSPECIFIED: i32 = 0;
