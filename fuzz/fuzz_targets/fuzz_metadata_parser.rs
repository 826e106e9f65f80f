//! Fuzz target for profile metadata and input file parsing.
//!
//! Goal: parsing, resolving, and seeding should **never panic** on any input.
//! Errors are fine.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_metadata_parser
//! ```

#![no_main]

use attest_inputs::InputRegistry;
use attest_settings::{Overrides, Platform};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let inputs = attest_settings::parse_input_file_toml(text).ok();
    let Ok(metadata) = attest_settings::parse_metadata_toml(text) else {
        return;
    };

    let host = Platform::new("ubuntu", "24.04").with_family("debian").with_family("linux");
    let files: Vec<_> = inputs.into_iter().collect();
    if let Ok(resolved) =
        attest_settings::resolve_profile(metadata, &files, Overrides::default(), Some(&host))
    {
        let _ = attest_settings::seed_inputs(&resolved, &mut InputRegistry::new());
    }
});
