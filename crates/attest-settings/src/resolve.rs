use crate::model::{InputFileV1, ProfileMetadataV1};
use crate::platform::{CompiledSupport, Platform, supports};
use anyhow::Context;
use attest_inputs::{InputOptions, InputRegistry, InputType, priority};
use attest_types::{ProfileSummary, ids};
use semver::{Version, VersionReq};
use serde_json::Value;
use std::collections::BTreeMap;

/// Version checked against a profile's `attest-version` requirement.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Values handed over by the runner. They outrank every other provider.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    /// Replaces the metadata `name` as profile id.
    pub profile: Option<String>,
    pub inputs: BTreeMap<String, Value>,
}

/// One input declaration or value to apply to the registry.
#[derive(Clone, Debug, PartialEq)]
pub struct InputSeed {
    pub name: String,
    pub options: InputOptions,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedProfile {
    pub profile_id: String,
    pub summary: ProfileSummary,
    /// `<name>/<release>` when the host platform is not supported.
    pub unsupported_platform: Option<String>,
    /// The running attest version when the profile's `attest-version` excludes it.
    pub unsupported_version: Option<String>,
    /// Metadata defaults, then input files in order, then overrides.
    pub seeds: Vec<InputSeed>,
}

pub fn resolve_profile(
    metadata: ProfileMetadataV1,
    input_files: &[InputFileV1],
    overrides: Overrides,
    platform: Option<&Platform>,
) -> anyhow::Result<ResolvedProfile> {
    let profile_id = overrides
        .profile
        .clone()
        .unwrap_or_else(|| metadata.name.clone());
    if profile_id.trim().is_empty() {
        anyhow::bail!("profile metadata has no name");
    }

    let compiled = metadata
        .supports
        .iter()
        .enumerate()
        .map(|(i, entry)| CompiledSupport::compile(i, entry))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let unsupported_platform = platform
        .filter(|host| !supports(&compiled, host))
        .map(Platform::label);
    if let Some(label) = &unsupported_platform {
        tracing::debug!(profile = %profile_id, platform = %label, "platform not supported");
    }

    let unsupported_version = match metadata.attest_version.as_deref() {
        Some(req) => unsupported_tool_version(req, TOOL_VERSION)?,
        None => None,
    };
    if let Some(version) = &unsupported_version {
        tracing::debug!(profile = %profile_id, version = %version, "attest version not supported");
    }

    let mut seeds = Vec::new();
    for decl in &metadata.inputs {
        let mut options = InputOptions::new()
            .required(decl.required)
            .provider(ids::PROVIDER_PROFILE_METADATA);
        if let Some(t) = decl.input_type.as_deref() {
            let input_type: InputType = t
                .parse()
                .with_context(|| format!("invalid type for input '{}'", decl.name))?;
            options = options.input_type(input_type);
        }
        if let Some(value) = &decl.value {
            options = options
                .value(value.clone())
                .priority(decl.priority.unwrap_or(priority::PROFILE_METADATA));
        }
        if let Some(title) = &decl.title {
            options = options.title(title.clone());
        }
        if let Some(description) = &decl.description {
            options = options.description(description.clone());
        }
        seeds.push(InputSeed {
            name: decl.name.clone(),
            options,
        });
    }

    for file in input_files {
        for (name, value) in &file.values {
            seeds.push(value_seed(name, value, priority::INPUT_FILE, ids::PROVIDER_INPUT_FILE));
        }
    }
    for (name, value) in &overrides.inputs {
        seeds.push(value_seed(name, value, priority::RUNNER_API, ids::PROVIDER_RUNNER_API));
    }

    let summary = ProfileSummary {
        name: profile_id.clone(),
        title: metadata.title,
        version: metadata.version,
        maintainer: metadata.maintainer,
        summary: metadata.summary,
        license: metadata.license,
    };

    Ok(ResolvedProfile {
        profile_id,
        summary,
        unsupported_platform,
        unsupported_version,
        seeds,
    })
}

/// `Some(running)` when `running` does not satisfy the requirement `req`.
pub(crate) fn unsupported_tool_version(req: &str, running: &str) -> anyhow::Result<Option<String>> {
    let req = VersionReq::parse(req)
        .with_context(|| format!("invalid attest-version requirement '{req}'"))?;
    let version =
        Version::parse(running).with_context(|| format!("invalid attest version '{running}'"))?;
    Ok((!req.matches(&version)).then(|| version.to_string()))
}

fn value_seed(name: &str, value: &Value, priority: i32, provider: &str) -> InputSeed {
    InputSeed {
        name: name.to_string(),
        options: InputOptions::new()
            .value(value.clone())
            .priority(priority)
            .provider(provider),
    }
}

/// Apply every seed to `inputs` under the resolved profile id, in order.
pub fn seed_inputs(resolved: &ResolvedProfile, inputs: &mut InputRegistry) -> anyhow::Result<()> {
    for seed in &resolved.seeds {
        inputs
            .find_or_register_at(&resolved.profile_id, &seed.name, seed.options.clone(), None)
            .with_context(|| format!("seeding input '{}'", seed.name))?;
    }
    Ok(())
}
