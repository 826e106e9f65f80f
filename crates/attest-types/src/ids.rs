//! Stable identifiers for validation findings, input providers, and skip messages.
//!
//! `code` values are dotted: `<subject>.<condition>`.

// Codes: controls
pub const CODE_CONTROL_EMPTY_ID: &str = "control.empty_id";
pub const CODE_CONTROL_NO_TITLE: &str = "control.no_title";
pub const CODE_CONTROL_NO_DESCRIPTION: &str = "control.no_description";
pub const CODE_CONTROL_NO_CHECKS: &str = "control.no_checks";
pub const CODE_CONTROL_DUPLICATE_ID: &str = "control.duplicate_id";

// Codes: profile
pub const CODE_PROFILE_NO_CONTROLS: &str = "profile.no_controls";

// Codes: inputs
pub const CODE_INPUT_REQUIRED_UNRESOLVED: &str = "input.required_unresolved";

// Input providers
pub const PROVIDER_PROFILE_METADATA: &str = "profile_metadata";
pub const PROVIDER_INLINE_CONTROL_CODE: &str = "inline_control_code";
pub const PROVIDER_INPUT_FILE: &str = "input_file";
pub const PROVIDER_RUNNER_API: &str = "runner_api";

/// Prefix shared by every synthesized control id.
pub const GENERATED_ID_PREFIX: &str = "(generated from ";

/// Skip message used when an `only_if` guard carries no message of its own.
pub const DEFAULT_ONLY_IF_MESSAGE: &str = "Skipped control due to only_if condition.";
