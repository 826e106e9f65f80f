//! Explain registry for validation codes.
//!
//! Maps finding codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a finding code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the code.
    pub title: &'static str,
    /// What the finding means.
    pub description: &'static str,
    /// How to fix it.
    pub remediation: &'static str,
}

/// Look up an explanation by code. Returns `None` for unknown codes.
pub fn lookup_explanation(code: &str) -> Option<Explanation> {
    match code {
        ids::CODE_CONTROL_EMPTY_ID => Some(Explanation {
            title: "Control Without ID",
            description: "\
A control was registered with an empty or blank id. The registry still stores it,
but it cannot be referenced, filtered, or reported on.",
            remediation: "Give every `control` a stable, non-empty id.",
        }),
        ids::CODE_CONTROL_NO_TITLE => Some(Explanation {
            title: "Control Without Title",
            description: "The control does not declare a title.",
            remediation: "Call `title(...)` inside the control body.",
        }),
        ids::CODE_CONTROL_NO_DESCRIPTION => Some(Explanation {
            title: "Control Without Description",
            description: "The control does not declare a description.",
            remediation: "Call `desc(...)` inside the control body.",
        }),
        ids::CODE_CONTROL_NO_CHECKS => Some(Explanation {
            title: "Control Without Checks",
            description: "\
The control registers no `describe`/`expect` checks, so it can never pass or fail.",
            remediation: "Add at least one check, or remove the control.",
        }),
        ids::CODE_CONTROL_DUPLICATE_ID => Some(Explanation {
            title: "Duplicate Control ID",
            description: "\
The same control id was registered more than once. The registrations were merged:
checks were concatenated and the latest title, description, and impact won.",
            remediation: "Rename one of the controls, or merge them intentionally.",
        }),
        ids::CODE_PROFILE_NO_CONTROLS => Some(Explanation {
            title: "Profile Without Controls",
            description: "No controls or checks were defined by the profile.",
            remediation: "Add control files, or check that they were handed to the loader.",
        }),
        ids::CODE_INPUT_REQUIRED_UNRESOLVED => Some(Explanation {
            title: "Required Input Without Value",
            description: "\
An input marked `required` never received a value from profile metadata,
inline control code, an input file, or a runtime override.",
            remediation: "Supply a value in an input file or as a runtime override.",
        }),
        _ => None,
    }
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_CONTROL_EMPTY_ID,
        ids::CODE_CONTROL_NO_TITLE,
        ids::CODE_CONTROL_NO_DESCRIPTION,
        ids::CODE_CONTROL_NO_CHECKS,
        ids::CODE_CONTROL_DUPLICATE_ID,
        ids::CODE_PROFILE_NO_CONTROLS,
        ids::CODE_INPUT_REQUIRED_UNRESOLVED,
    ]
}
