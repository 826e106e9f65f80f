use crate::registry::RuleRegistry;
use crate::rule::Reference;
use attest_inputs::{InputRegistry, InputType};
use attest_types::{ProfileSummary, SourceLocation, SourcePath};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Impact reported for controls that never set one.
pub const DEFAULT_IMPACT: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileInfo {
    #[serde(flatten)]
    pub profile: ProfileSummary,
    pub controls: Vec<ControlInfo>,
    pub groups: Vec<GroupInfo>,
    pub inputs: Vec<InputInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ControlInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub descriptions: IndexMap<String, String>,
    pub impact: f64,
    pub tags: IndexMap<String, Value>,
    pub refs: Vec<Reference>,
    pub checks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_location: Option<SourceLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupInfo {
    pub id: SourcePath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub controls: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InputInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputType>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Summarize a loaded profile. Controls without an id are left out.
pub fn profile_info(
    profile: ProfileSummary,
    registry: &RuleRegistry,
    inputs: &InputRegistry,
    profile_id: &str,
) -> ProfileInfo {
    let controls = registry
        .rules()
        .map(|(_, rule)| rule)
        .filter(|rule| !rule.has_blank_id())
        .map(|rule| ControlInfo {
            id: rule.id.clone(),
            title: rule.title.clone(),
            desc: rule.desc.clone(),
            descriptions: rule.descriptions.clone(),
            impact: rule.impact().unwrap_or(DEFAULT_IMPACT),
            tags: rule.tags.clone(),
            refs: rule.refs.clone(),
            checks: rule.checks.len(),
            source_location: rule.location.clone(),
            skip_message: rule.skip_message().map(str::to_string),
        })
        .collect();

    let groups = registry
        .groups()
        .iter()
        .filter_map(|(file, group)| {
            let controls: Vec<String> = group
                .controls
                .iter()
                .filter_map(|full_id| registry.get(full_id))
                .filter(|rule| !rule.has_blank_id())
                .map(|rule| rule.id.clone())
                .collect();
            (!controls.is_empty()).then(|| GroupInfo {
                id: file.clone(),
                title: group.title().map(str::to_string),
                controls,
            })
        })
        .collect();

    let inputs = inputs
        .inputs(profile_id)
        .map(|input| InputInfo {
            name: input.name().to_string(),
            value: input.value().cloned(),
            input_type: input.input_type(),
            required: input.is_required(),
            title: input.title().map(str::to_string),
            description: input.description().map(str::to_string),
        })
        .collect();

    ProfileInfo {
        profile,
        controls,
        groups,
        inputs,
    }
}
