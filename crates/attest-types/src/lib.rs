//! Stable DTOs and IDs used across the attest workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted validation receipt
//! - stable string IDs and codes
//! - canonical source paths and locations for control definitions
//! - profile summary metadata
//! - explain registry for validation findings

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod path;
pub mod profile;
pub mod receipt;

pub use explain::{lookup_explanation, Explanation};
pub use path::{SourceLocation, SourcePath};
pub use profile::ProfileSummary;
pub use receipt::{
    Finding, Severity, ToolMeta, ValidationReport, ValidationSummary, SCHEMA_VALIDATION_REPORT_V1,
};
