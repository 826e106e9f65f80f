use crate::SourceLocation;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

/// Stable schema identifier for the validation receipt.
pub const SCHEMA_VALIDATION_REPORT_V1: &str = "attest.validation.v1";

/// Severity is intentionally small: errors invalidate a profile, warnings are lint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub severity: Severity,
    pub code: String,
    pub message: String,

    /// Full id of the control the finding is about, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Code-specific structured payload (kept open-ended for forward compatibility).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: JsonValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ValidationSummary {
    /// True when no error findings were produced.
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Number of live (non-tombstoned) controls.
    pub controls: u32,
    pub inputs: u32,
}

/// Receipt emitted by the validation pass over a loaded profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationReport {
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub summary: ValidationSummary,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}
