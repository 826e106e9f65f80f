//! Use case orchestration for attest.
//!
//! This crate provides the application layer: use cases that coordinate settings, input
//! seeding, control loading, and validation. It is intentionally thin and delegates heavy
//! lifting to the appropriate layers.

#![forbid(unsafe_code)]

mod check;
mod explain;
mod info;
mod load;

pub use check::{CheckInput, CheckOutput, exit_code, run_check, serialize_report};
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use info::{InfoInput, run_info, serialize_info};
pub use load::{LoadedProfile, ProfileInput, load_profile};
