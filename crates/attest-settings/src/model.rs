use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `attest.toml` schema v1.
///
/// This is a *user-facing* model: unknown keys are ignored so newer files still load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileMetadataV1 {
    /// Optional schema string for tooling (`attest.profile.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Profile id. Control full ids are `<name>/<id>`.
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Semver requirement on the running attest version, e.g. `>=0.1`.
    #[serde(default, rename = "attest-version", skip_serializing_if = "Option::is_none")]
    pub attest_version: Option<String>,

    /// Platforms the profile runs on. Empty means every platform.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supports: Vec<SupportEntry>,

    /// Inputs declared with their defaults.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<InputDeclaration>,
}

/// One `[[supports]]` entry. Every key that is present must match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct SupportEntry {
    /// Platform name or any of its families.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_family: Option<String>,

    /// Glob over the platform name, e.g. `ubuntu*`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_name: Option<String>,

    /// Glob over the release, e.g. `22.*`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
}

/// One `[[inputs]]` entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InputDeclaration {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// `String`, `Numeric`, `Regexp`, `Array`, `Hash`, `Boolean`, or `Any` (any case).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Overrides the metadata priority band for this default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

/// Input file schema v1: a flat table of input name to value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct InputFileV1 {
    pub values: BTreeMap<String, Value>,
}
