//! Sequential evaluation of control units against one profile session.
//!
//! A [`ProfileContext`] owns the rule registry for one profile and borrows the
//! session's [`InputRegistry`]. Each [`ControlUnit`] is run with a
//! [`ControlEvalContext`], the per-file view through which control code registers
//! controls, guards files with `only_if`, and reads inputs.

use crate::builder::RuleBuilder;
use crate::registry::{Registration, RuleRegistry};
use crate::rule::{Check, CheckMethod, Rule, full_id};
use attest_inputs::{Input, InputError, InputOptions, InputRegistry, priority};
use attest_types::{SourceLocation, SourcePath, ids};
use serde_json::Value;
use std::collections::BTreeMap;
use std::panic::Location;

type UnitBody<R> = Box<dyn FnOnce(&mut ControlEvalContext<'_, '_, R>) -> anyhow::Result<()>>;

/// One piece of control-definition source: a body plus where it came from.
pub struct ControlUnit<R> {
    file: SourcePath,
    line: u32,
    body: UnitBody<R>,
}

impl<R> ControlUnit<R> {
    pub fn new<F>(file: impl Into<SourcePath>, line: u32, body: F) -> Self
    where
        F: FnOnce(&mut ControlEvalContext<'_, '_, R>) -> anyhow::Result<()> + 'static,
    {
        Self {
            file: file.into(),
            line,
            body: Box::new(body),
        }
    }

    /// Unit attributed to the Rust source location of the call.
    #[track_caller]
    pub fn here<F>(body: F) -> Self
    where
        F: FnOnce(&mut ControlEvalContext<'_, '_, R>) -> anyhow::Result<()> + 'static,
    {
        let loc = Location::caller();
        Self::new(loc.file(), loc.line(), body)
    }

    pub fn file(&self) -> &SourcePath {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextOptions {
    /// Enumerate controls without evaluating any `only_if` guard.
    pub skip_only_if_eval: bool,
    /// `<name>/<release>` of a host platform the profile does not support.
    pub unsupported_platform: Option<String>,
    /// Running attest version, when the profile's version requirement excludes it.
    pub unsupported_version: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum OnlyIfState {
    Normal,
    Skipped(String),
}

/// Registration state for one profile's loading session.
pub struct ProfileContext<'a, R> {
    profile_id: String,
    resources: R,
    registry: RuleRegistry,
    inputs: &'a mut InputRegistry,
    file_states: BTreeMap<SourcePath, OnlyIfState>,
    options: ContextOptions,
}

impl<'a, R> ProfileContext<'a, R> {
    pub fn new(
        profile_id: impl Into<String>,
        resources: R,
        inputs: &'a mut InputRegistry,
        options: ContextOptions,
    ) -> Self {
        Self {
            profile_id: profile_id.into(),
            resources,
            registry: RuleRegistry::new(),
            inputs,
            file_states: BTreeMap::new(),
            options,
        }
    }

    /// Run one unit. Its error is returned as is; controls it registered before
    /// failing stay registered.
    pub fn load(&mut self, unit: ControlUnit<R>) -> anyhow::Result<()> {
        let ControlUnit { file, line, body } = unit;
        tracing::debug!(profile = %self.profile_id, file = %file, line, "loading control unit");
        self.registry.begin_load(file.clone());
        self.file_states.entry(file.clone()).or_insert(OnlyIfState::Normal);
        let mut ctx = ControlEvalContext {
            profile: self,
            file,
            start_line: line,
        };
        body(&mut ctx)
    }

    /// Load units in order, stopping at the first failure.
    pub fn load_all(
        &mut self,
        units: impl IntoIterator<Item = ControlUnit<R>>,
    ) -> anyhow::Result<()> {
        for unit in units {
            self.load(unit)?;
        }
        Ok(())
    }

    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn inputs(&self) -> &InputRegistry {
        &*self.inputs
    }

    /// Whether an `only_if` guard has skipped `file`.
    pub fn is_file_skipped(&self, file: &SourcePath) -> bool {
        matches!(self.file_states.get(file), Some(OnlyIfState::Skipped(_)))
    }

    pub fn into_registry(self) -> RuleRegistry {
        self.registry
    }
}

/// What control code sees while one unit executes.
pub struct ControlEvalContext<'c, 'a, R> {
    profile: &'c mut ProfileContext<'a, R>,
    file: SourcePath,
    start_line: u32,
}

impl<R> ControlEvalContext<'_, '_, R> {
    pub fn profile_id(&self) -> &str {
        &self.profile.profile_id
    }

    pub fn file(&self) -> &SourcePath {
        &self.file
    }

    pub fn resources(&self) -> &R {
        &self.profile.resources
    }

    /// Group title for every control of this file.
    pub fn title(&mut self, title: impl Into<String>) {
        self.profile.registry.set_header("title", title);
    }

    /// Define a control. A body error aborts the definition and is returned unchanged;
    /// nothing is registered for it.
    #[track_caller]
    pub fn control<F>(
        &mut self,
        id: impl Into<String>,
        body: F,
    ) -> anyhow::Result<Option<Registration>>
    where
        F: FnOnce(&mut RuleBuilder<'_, R>) -> anyhow::Result<()>,
    {
        let location = locate(&self.file, self.start_line, Location::caller());
        self.define(id.into(), location, body)
    }

    /// Alias of [`ControlEvalContext::control`].
    #[track_caller]
    pub fn rule<F>(
        &mut self,
        id: impl Into<String>,
        body: F,
    ) -> anyhow::Result<Option<Registration>>
    where
        F: FnOnce(&mut RuleBuilder<'_, R>) -> anyhow::Result<()>,
    {
        self.control(id, body)
    }

    /// Bare `describe`: an anonymous control holding one check. Returns the generated id.
    #[track_caller]
    pub fn describe(&mut self, args: impl IntoIterator<Item = Value>) -> anyhow::Result<String> {
        let location = locate(&self.file, self.start_line, Location::caller());
        let id = generated_id(&location);
        let mut check = Check::new(CheckMethod::Describe, args);
        check.location = Some(location.clone());
        self.define(id.clone(), location, move |rule| {
            rule.add_check(check);
            Ok(())
        })?;
        Ok(id)
    }

    fn define<F>(
        &mut self,
        id: String,
        location: SourceLocation,
        body: F,
    ) -> anyhow::Result<Option<Registration>>
    where
        F: FnOnce(&mut RuleBuilder<'_, R>) -> anyhow::Result<()>,
    {
        let profile = &mut *self.profile;
        let mut rule = Rule::new(id, Some(profile.profile_id.as_str()));
        rule.location = Some(location);
        rule.group_title = profile.registry.header("title").map(str::to_string);

        let mut builder = RuleBuilder::new(
            rule,
            &profile.resources,
            &mut *profile.inputs,
            &profile.profile_id,
            &self.file,
            self.start_line,
            profile.options.skip_only_if_eval,
        );
        body(&mut builder)?;
        let rule = builder.into_rule();
        Ok(self.register_control(rule))
    }

    fn register_control(&mut self, mut rule: Rule) -> Option<Registration> {
        let profile = &mut *self.profile;
        if let Some(platform) = &profile.options.unsupported_platform {
            rule.skip(format!(
                "Profile `{}` is not supported on platform {platform}.",
                profile.profile_id
            ));
        }
        if let Some(version) = &profile.options.unsupported_version {
            rule.skip(format!(
                "Profile `{}` is not supported on attest version ({version}).",
                profile.profile_id
            ));
        }
        if let Some(OnlyIfState::Skipped(message)) = profile.file_states.get(&self.file) {
            rule.skip(message.clone());
        }
        profile.registry.register(rule)
    }

    /// File-level guard. The first false condition skips every control of this file,
    /// including those already registered; the file never returns to normal.
    pub fn only_if(&mut self, message: Option<&str>, condition: impl FnOnce(&R) -> bool) {
        let profile = &mut *self.profile;
        if profile.options.skip_only_if_eval {
            return;
        }
        if matches!(profile.file_states.get(&self.file), Some(OnlyIfState::Skipped(_))) {
            return;
        }
        if condition(&profile.resources) {
            return;
        }

        let message = message.unwrap_or(ids::DEFAULT_ONLY_IF_MESSAGE).to_string();
        let skipped = profile.registry.skip_from_file(&self.file, &message);
        tracing::debug!(
            profile = %profile.profile_id,
            file = %self.file,
            retroactive = skipped,
            "only_if false, skipping file"
        );
        profile
            .file_states
            .insert(self.file.clone(), OnlyIfState::Skipped(message));
    }

    /// Tombstone a control of this profile by local id.
    pub fn skip_control(&mut self, id: &str) {
        let full = full_id(Some(&self.profile.profile_id), id);
        self.profile.registry.unregister(&full);
    }

    /// Alias of [`ControlEvalContext::skip_control`].
    pub fn skip_rule(&mut self, id: &str) {
        self.skip_control(id);
    }

    /// Read an input. With a value in `options` this declares an inline default at the
    /// inline-code priority; otherwise it records a fetch.
    #[track_caller]
    pub fn input(
        &mut self,
        name: &str,
        options: InputOptions,
    ) -> Result<Option<Value>, InputError> {
        let location = locate(&self.file, self.start_line, Location::caller());
        let profile = &mut *self.profile;
        resolve_input(profile.inputs, &profile.profile_id, name, options, location)
    }

    /// The input itself, for inspecting events. Records nothing beyond creation.
    #[track_caller]
    pub fn input_object(&mut self, name: &str) -> Result<&Input, InputError> {
        let location = locate(&self.file, self.start_line, Location::caller());
        let profile = &mut *self.profile;
        let input = profile.inputs.find_or_register_at(
            &profile.profile_id,
            name,
            InputOptions::new(),
            Some(location),
        )?;
        Ok(&*input)
    }
}

pub(crate) fn resolve_input(
    inputs: &mut InputRegistry,
    profile_id: &str,
    name: &str,
    mut options: InputOptions,
    location: SourceLocation,
) -> Result<Option<Value>, InputError> {
    if options.value.is_some() {
        if options.priority.is_none() {
            options.priority = Some(priority::INLINE_CONTROL_CODE);
        }
        if options.provider.is_none() {
            options.provider = Some(ids::PROVIDER_INLINE_CONTROL_CODE.to_string());
        }
        let input = inputs.find_or_register_at(profile_id, name, options, Some(location))?;
        return Ok(input.value().cloned());
    }

    let input = inputs.find_or_register_at(profile_id, name, options, Some(location.clone()))?;
    let value = input.value().cloned();
    input.update(attest_inputs::Event::fetch(value.is_some()).at(location))?;
    Ok(value)
}

/// Where a DSL call happened. The Rust call site is used when it lies in the unit's
/// own file; otherwise the unit's start line stands in.
pub(crate) fn locate(
    file: &SourcePath,
    start_line: u32,
    caller: &Location<'_>,
) -> SourceLocation {
    let here = SourcePath::new(caller.file());
    if &here == file {
        SourceLocation::new(here, caller.line())
    } else {
        SourceLocation::new(file.clone(), start_line)
    }
}

/// `(generated from <file>:<line> <32 hex chars>)`, unique per call.
pub fn generated_id(location: &SourceLocation) -> String {
    let nonce: [u8; 16] = rand::random();
    format!(
        "{}{}:{} {})",
        ids::GENERATED_ID_PREFIX,
        location.path.file_name(),
        location.line,
        hex::encode(nonce)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Host, load};

    #[test]
    fn locate_prefers_the_caller_line_inside_the_unit_file() {
        let here = Location::caller();
        let file = SourcePath::new(here.file());
        assert_eq!(locate(&file, 7, here), SourceLocation::new(file.clone(), here.line()));

        let elsewhere = SourcePath::new("controls/other.rs");
        assert_eq!(locate(&elsewhere, 7, here), SourceLocation::new(elsewhere.clone(), 7));
    }

    #[test]
    fn generated_ids_name_the_file_and_line() {
        let id = generated_id(&SourceLocation::new("profiles/base/controls/anon.rs", 4));
        assert!(id.starts_with("(generated from anon.rs:4 "));
        assert_eq!(id.len(), "(generated from anon.rs:4 ".len() + 32 + 1);
    }

    #[test]
    fn guards_see_the_session_resources() {
        let mut inputs = InputRegistry::new();
        let units = vec![
            ControlUnit::<Host>::new("controls/win.rs", 1, |ctx| {
                ctx.only_if(Some("windows only"), |host| host.os == "windows");
                ctx.control("win-1", |_| Ok(()))?;
                Ok(())
            }),
            ControlUnit::<Host>::new("controls/nix.rs", 1, |ctx| {
                ctx.only_if(None, |host| host.os == "linux");
                ctx.control("nix-1", |_| Ok(()))?;
                Ok(())
            }),
        ];
        let reg = load(ContextOptions::default(), &mut inputs, units).unwrap();
        assert_eq!(reg.get("p/win-1").unwrap().skip_message(), Some("windows only"));
        assert!(!reg.get("p/nix-1").unwrap().is_skipped());
    }

    #[test]
    fn control_and_rule_register_the_same_way() {
        let mut inputs = InputRegistry::new();
        let units = vec![ControlUnit::<Host>::new("controls/a.rs", 1, |ctx| {
            assert_eq!(ctx.control("a", |_| Ok(()))?, Some(Registration::Inserted));
            assert_eq!(ctx.rule("a", |_| Ok(()))?, Some(Registration::Merged));
            Ok(())
        })];
        let reg = load(ContextOptions::default(), &mut inputs, units).unwrap();
        assert_eq!(reg.duplicates().len(), 1);
        assert_eq!(reg.get("p/a").unwrap().location, Some(SourceLocation::new("controls/a.rs", 1)));
    }
}
