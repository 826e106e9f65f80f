use crate::context::{ContextOptions, ControlUnit, ProfileContext};
use crate::registry::RuleRegistry;
use attest_inputs::InputRegistry;

/// Host facts a test control can guard on.
#[derive(Clone, Debug, Default)]
pub struct Host {
    pub os: String,
}

pub fn linux() -> Host {
    Host { os: "linux".into() }
}

/// Load `units` into a fresh session for profile `p`.
pub fn load(
    options: ContextOptions,
    inputs: &mut InputRegistry,
    units: Vec<ControlUnit<Host>>,
) -> anyhow::Result<RuleRegistry> {
    let mut ctx = ProfileContext::new("p", linux(), inputs, options);
    ctx.load_all(units)?;
    Ok(ctx.into_registry())
}
