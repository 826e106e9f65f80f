use crate::registry::RuleRegistry;
use crate::rule::Rule;
use attest_inputs::InputRegistry;
use attest_types::{Finding, Severity, ValidationSummary, ids, lookup_explanation};
use serde_json::json;

/// Findings and summary of a validation pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Validation {
    pub findings: Vec<Finding>,
    pub summary: ValidationSummary,
}

/// Lint a finalized registry and the profile's inputs.
pub fn validate(registry: &RuleRegistry, inputs: &InputRegistry, profile_id: &str) -> Validation {
    let mut findings = Vec::new();

    for (full_id, rule) in registry.rules() {
        check_rule(full_id, rule, &mut findings);
    }

    for dup in registry.duplicates() {
        let mut f = finding(
            Severity::Warning,
            ids::CODE_CONTROL_DUPLICATE_ID,
            format!("control `{}` is defined more than once; checks were merged", dup.full_id),
        );
        f.control_id = Some(dup.full_id.clone());
        f.location = dup.duplicate.clone();
        if let Some(first) = &dup.first {
            f.data = json!({ "first": first.to_string() });
        }
        findings.push(f);
    }

    let live = registry.live_count();
    if live == 0 {
        findings.push(finding(
            Severity::Warning,
            ids::CODE_PROFILE_NO_CONTROLS,
            "no controls or tests were defined".to_string(),
        ));
    }

    for input in inputs.unresolved_required(profile_id) {
        let mut f = finding(
            Severity::Error,
            ids::CODE_INPUT_REQUIRED_UNRESOLVED,
            format!("input '{}' is required and does not have a value", input.name()),
        );
        f.data = json!({ "input": input.name() });
        findings.push(f);
    }

    findings.sort_by(compare_findings);

    let valid = !findings.iter().any(|f| f.severity == Severity::Error);
    Validation {
        findings,
        summary: ValidationSummary {
            valid,
            profile: (!profile_id.is_empty()).then(|| profile_id.to_string()),
            controls: live as u32,
            inputs: inputs.inputs(profile_id).count() as u32,
        },
    }
}

fn check_rule(full_id: &str, rule: &Rule, out: &mut Vec<Finding>) {
    let at = |severity, code, message: String| {
        let mut f = finding(severity, code, message);
        f.control_id = Some(full_id.to_string());
        f.location = rule.location.clone();
        f
    };

    if rule.has_blank_id() {
        out.push(at(
            Severity::Error,
            ids::CODE_CONTROL_EMPTY_ID,
            "control has no id".to_string(),
        ));
        return;
    }
    if rule.is_generated() {
        return;
    }

    if rule.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        out.push(at(
            Severity::Warning,
            ids::CODE_CONTROL_NO_TITLE,
            format!("control `{}` has no title", rule.id),
        ));
    }
    if rule.desc.as_deref().is_none_or(|d| d.trim().is_empty()) {
        out.push(at(
            Severity::Warning,
            ids::CODE_CONTROL_NO_DESCRIPTION,
            format!("control `{}` has no description", rule.id),
        ));
    }
    if rule.checks.is_empty() && !rule.is_skipped() {
        out.push(at(
            Severity::Warning,
            ids::CODE_CONTROL_NO_CHECKS,
            format!("control `{}` has no checks", rule.id),
        ));
    }
}

fn finding(severity: Severity, code: &str, message: String) -> Finding {
    Finding {
        severity,
        code: code.to_string(),
        message,
        control_id: None,
        location: None,
        help: lookup_explanation(code).map(|e| e.remediation.to_string()),
        data: serde_json::Value::Null,
    }
}

fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    // severity (error first), path, line (missing last), control, code, message
    let severity_rank = |sev: Severity| match sev {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    };
    let key = |f: &Finding| match &f.location {
        Some(l) => (l.path.as_str().to_string(), l.line),
        None => ("~".to_string(), u32::MAX),
    };
    let (ap, al) = key(a);
    let (bp, bl) = key(b);

    severity_rank(a.severity)
        .cmp(&severity_rank(b.severity))
        .then(ap.cmp(&bp))
        .then(al.cmp(&bl))
        .then(a.control_id.cmp(&b.control_id))
        .then(a.code.cmp(&b.code))
        .then(a.message.cmp(&b.message))
}
