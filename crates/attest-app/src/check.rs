//! The `check` use case: load a profile and produce a validation report.

use crate::load::{ProfileInput, load_profile};
use anyhow::Context;
use attest_settings::ResolvedProfile;
use attest_types::{SCHEMA_VALIDATION_REPORT_V1, Severity, ToolMeta, ValidationReport};
use time::OffsetDateTime;

/// Input for the check use case.
pub type CheckInput<'a, R> = ProfileInput<'a, R>;

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub report: ValidationReport,
    pub resolved: ResolvedProfile,
}

/// Run the check use case. Guards are not evaluated, so every control is enumerated.
pub fn run_check<R>(input: CheckInput<'_, R>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    let loaded = load_profile(input, true)?;
    let validation =
        attest_domain::validate(&loaded.registry, &loaded.inputs, &loaded.resolved.profile_id);
    let (errors, warnings): (Vec<_>, Vec<_>) = validation
        .findings
        .into_iter()
        .partition(|f| f.severity == Severity::Error);

    let report = ValidationReport {
        schema: SCHEMA_VALIDATION_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "attest".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        summary: validation.summary,
        errors,
        warnings,
    };

    Ok(CheckOutput {
        report,
        resolved: loaded.resolved,
    })
}

/// 0 for a valid profile, 2 otherwise.
pub fn exit_code(report: &ValidationReport) -> i32 {
    if report.summary.valid { 0 } else { 2 }
}

pub fn serialize_report(report: &ValidationReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize validation report")
}
