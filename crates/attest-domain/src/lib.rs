//! Control registration and evaluation (no IO).
//!
//! Input: control units plus a seeded [`attest_inputs::InputRegistry`].
//! Output: a [`RuleRegistry`] of controls, validation findings, and profile info.

#![forbid(unsafe_code)]

mod builder;
mod context;
pub mod info;
mod registry;
pub mod rule;
mod validate;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use builder::{DescribeOne, RuleBuilder};
pub use context::{ContextOptions, ControlEvalContext, ControlUnit, ProfileContext, generated_id};
pub use info::{ProfileInfo, profile_info};
pub use registry::{DuplicateControl, Group, Registration, RuleRegistry};
pub use rule::{Check, CheckMethod, Reference, Rule, full_id};
pub use validate::{Validation, validate};
