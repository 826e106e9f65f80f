//! Public facade over the attest core.
//!
//! Control code is written against [`ControlEvalContext`] and [`RuleBuilder`]; resources
//! that expose tabular data implement [`filter::FilterResource`].

#![forbid(unsafe_code)]

pub use attest_domain::{
    Check, CheckMethod, ContextOptions, ControlEvalContext, ControlUnit, DescribeOne,
    DuplicateControl, Group, ProfileContext, ProfileInfo, Reference, Registration, Rule,
    RuleBuilder, RuleRegistry, Validation, full_id, generated_id, profile_info, validate,
};
pub use attest_inputs::{
    Event, EventAction, Input, InputError, InputOptions, InputRegistry, InputType, priority,
};
pub use attest_types::{Finding, ProfileSummary, Severity, SourceLocation, SourcePath, ids};

/// Filter tables for resources with tabular data.
pub mod filter {
    pub use attest_filter::*;
}
