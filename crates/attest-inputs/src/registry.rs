use crate::error::InputError;
use crate::event::Event;
use crate::input::{Input, InputOptions};
use attest_types::SourceLocation;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::Value;
use std::collections::BTreeMap;

/// Every input known to a loading session, scoped by profile id.
///
/// Owned by the caller and handed to each profile context by `&mut`, so separate
/// sessions never share state.
#[derive(Clone, Debug, Default)]
pub struct InputRegistry {
    profiles: BTreeMap<String, IndexMap<String, Input>>,
}

impl InputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only lookup. Never records an event.
    pub fn find(&self, profile: &str, name: &str) -> Option<&Input> {
        self.profiles.get(profile).and_then(|inputs| inputs.get(name))
    }

    /// Look up an input, creating it on first reference. Options are merged into an
    /// existing input; a supplied value becomes a set event. No fetch event is recorded.
    #[track_caller]
    pub fn find_or_register(
        &mut self,
        profile: &str,
        name: &str,
        options: InputOptions,
    ) -> Result<&mut Input, InputError> {
        let location = SourceLocation::caller();
        self.find_or_register_at(profile, name, options, Some(location))
    }

    /// As [`InputRegistry::find_or_register`], with an explicit (possibly unknown) location.
    pub fn find_or_register_at(
        &mut self,
        profile: &str,
        name: &str,
        options: InputOptions,
        location: Option<SourceLocation>,
    ) -> Result<&mut Input, InputError> {
        let inputs = self.profiles.entry(profile.to_string()).or_default();
        match inputs.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let input = entry.into_mut();
                input.apply_options(options, location)?;
                Ok(input)
            }
            Entry::Vacant(entry) => {
                tracing::debug!(profile, input = name, "registering input");
                let input = Input::new_at(name, options, location)?;
                Ok(entry.insert(input))
            }
        }
    }

    /// Append an event to an input, creating the input if needed.
    #[track_caller]
    pub fn record(&mut self, profile: &str, name: &str, event: Event) -> Result<(), InputError> {
        let location = SourceLocation::caller();
        self.find_or_register_at(profile, name, InputOptions::new(), Some(location))?
            .update(event)
    }

    /// Resolve an input for control code. Records a fetch event noting whether a value
    /// was found; returns `None` when nothing set the input.
    #[track_caller]
    pub fn fetch(&mut self, profile: &str, name: &str) -> Result<Option<Value>, InputError> {
        let location = SourceLocation::caller();
        let input =
            self.find_or_register_at(profile, name, InputOptions::new(), Some(location.clone()))?;
        let value = input.value().cloned();
        input.update(Event::fetch(value.is_some()).at(location))?;
        Ok(value)
    }

    /// Inputs of one profile, in first-reference order.
    pub fn inputs(&self, profile: &str) -> impl Iterator<Item = &Input> {
        self.profiles
            .get(profile)
            .into_iter()
            .flat_map(|inputs| inputs.values())
    }

    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Required inputs of `profile` that no provider ever set.
    pub fn unresolved_required(&self, profile: &str) -> Vec<&Input> {
        self.inputs(profile)
            .filter(|input| input.is_unresolved_required())
            .collect()
    }
}
