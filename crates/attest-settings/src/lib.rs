//! Profile metadata parsing and input seeding.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod platform;
mod resolve;

pub use model::{InputDeclaration, InputFileV1, ProfileMetadataV1, SupportEntry};
pub use platform::Platform;
pub use resolve::{InputSeed, Overrides, ResolvedProfile, TOOL_VERSION, seed_inputs};

/// Parse `attest.toml` into a typed model.
pub fn parse_metadata_toml(input: &str) -> anyhow::Result<ProfileMetadataV1> {
    let cfg: ProfileMetadataV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Parse an input file (a flat table of input name to value).
pub fn parse_input_file_toml(input: &str) -> anyhow::Result<InputFileV1> {
    let file: InputFileV1 = toml::from_str(input)?;
    Ok(file)
}

/// Resolve the profile identity, platform support, and the ordered input seeds.
pub fn resolve_profile(
    metadata: ProfileMetadataV1,
    input_files: &[InputFileV1],
    overrides: Overrides,
    platform: Option<&Platform>,
) -> anyhow::Result<ResolvedProfile> {
    resolve::resolve_profile(metadata, input_files, overrides, platform)
}
