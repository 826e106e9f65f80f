//! Shared loading pipeline: settings, input seeding, then control units.

use anyhow::Context;
use attest_domain::{ContextOptions, ControlUnit, ProfileContext, RuleRegistry};
use attest_inputs::InputRegistry;
use attest_settings::{Overrides, Platform, ResolvedProfile};

/// Everything needed to load one profile.
pub struct ProfileInput<'a, R> {
    /// `attest.toml` contents.
    pub metadata_text: &'a str,
    /// Input file contents, lowest precedence first.
    pub input_files: Vec<&'a str>,
    /// Runner overrides.
    pub overrides: Overrides,
    /// Host platform; `None` skips the support check.
    pub platform: Option<Platform>,
    /// What control code queries (the host, fixtures, ...).
    pub resources: R,
    /// Control definitions, in load order.
    pub units: Vec<ControlUnit<R>>,
}

/// A fully loaded profile session.
#[derive(Debug)]
pub struct LoadedProfile {
    pub resolved: ResolvedProfile,
    pub registry: RuleRegistry,
    pub inputs: InputRegistry,
}

/// Parse, resolve, seed, and load every unit. The first failing unit aborts loading.
pub fn load_profile<R>(
    input: ProfileInput<'_, R>,
    skip_only_if_eval: bool,
) -> anyhow::Result<LoadedProfile> {
    let ProfileInput {
        metadata_text,
        input_files,
        overrides,
        platform,
        resources,
        units,
    } = input;

    let metadata = attest_settings::parse_metadata_toml(metadata_text).context("parse metadata")?;
    let input_files = input_files
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            attest_settings::parse_input_file_toml(text)
                .with_context(|| format!("parse input file #{}", i + 1))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let resolved =
        attest_settings::resolve_profile(metadata, &input_files, overrides, platform.as_ref())
            .context("resolve profile")?;

    let mut inputs = InputRegistry::new();
    attest_settings::seed_inputs(&resolved, &mut inputs).context("seed inputs")?;

    tracing::debug!(
        profile = %resolved.profile_id,
        units = units.len(),
        skip_only_if_eval,
        "loading profile"
    );
    let options = ContextOptions {
        skip_only_if_eval,
        unsupported_platform: resolved.unsupported_platform.clone(),
        unsupported_version: resolved.unsupported_version.clone(),
    };
    let mut ctx = ProfileContext::new(resolved.profile_id.clone(), resources, &mut inputs, options);
    ctx.load_all(units)
        .with_context(|| format!("load controls of profile {}", resolved.profile_id))?;
    let registry = ctx.into_registry();

    Ok(LoadedProfile {
        resolved,
        registry,
        inputs,
    })
}
