//! The `info` use case: summarize a profile with guards evaluated.

use crate::load::{ProfileInput, load_profile};
use anyhow::Context;
use attest_domain::{ProfileInfo, profile_info};

/// Input for the info use case.
pub type InfoInput<'a, R> = ProfileInput<'a, R>;

pub fn run_info<R>(input: InfoInput<'_, R>) -> anyhow::Result<ProfileInfo> {
    let loaded = load_profile(input, false)?;
    Ok(profile_info(
        loaded.resolved.summary,
        &loaded.registry,
        &loaded.inputs,
        &loaded.resolved.profile_id,
    ))
}

pub fn serialize_info(info: &ProfileInfo) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(info).context("serialize profile info")
}
