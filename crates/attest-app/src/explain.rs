//! The `explain` use case: look up documentation for a finding code.

use attest_types::explain::{self, Explanation};

#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(Explanation),
    NotFound {
        identifier: String,
        available_codes: &'static [&'static str],
    },
}

pub fn run_explain(identifier: &str) -> ExplainOutput {
    match explain::lookup_explanation(identifier) {
        Some(exp) => ExplainOutput::Found(exp),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_codes: explain::all_codes(),
        },
    }
}

/// Format an explanation for terminal display.
pub fn format_explanation(exp: &Explanation) -> String {
    let mut out = String::new();
    out.push_str(exp.title);
    out.push('\n');
    out.push_str(&"=".repeat(exp.title.len()));
    out.push_str("\n\n");
    out.push_str(exp.description);
    out.push_str("\n\nRemediation\n-----------\n");
    out.push_str(exp.remediation);
    out.push('\n');
    out
}

pub fn format_not_found(identifier: &str, codes: &[&'static str]) -> String {
    let mut out = format!("Unknown code: {identifier}\n\nAvailable codes:\n");
    for code in codes {
        out.push_str(&format!("  - {code}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_types::ids;

    #[test]
    fn known_codes_render_with_remediation() {
        let ExplainOutput::Found(exp) = run_explain(ids::CODE_CONTROL_NO_CHECKS) else {
            panic!("expected an explanation");
        };
        let text = format_explanation(&exp);
        assert!(text.starts_with(exp.title));
        assert!(text.contains("Remediation"));
    }

    #[test]
    fn unknown_codes_list_the_alternatives() {
        let ExplainOutput::NotFound {
            identifier,
            available_codes,
        } = run_explain("nope")
        else {
            panic!("expected not found");
        };
        let text = format_not_found(&identifier, available_codes);
        assert!(text.contains("Unknown code: nope"));
        assert!(text.contains(ids::CODE_INPUT_REQUIRED_UNRESOLVED));
    }
}
