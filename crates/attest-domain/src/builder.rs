use crate::context::locate;
use crate::rule::{Check, CheckMethod, Reference, Rule};
use attest_inputs::{InputError, InputOptions, InputRegistry};
use attest_types::{SourcePath, ids};
use serde_json::Value;
use std::panic::Location;

/// Body-side view of a control while it is being defined.
pub struct RuleBuilder<'r, R> {
    rule: Rule,
    resources: &'r R,
    inputs: &'r mut InputRegistry,
    profile_id: &'r str,
    file: &'r SourcePath,
    start_line: u32,
    skip_only_if_eval: bool,
}

impl<'r, R> RuleBuilder<'r, R> {
    pub(crate) fn new(
        rule: Rule,
        resources: &'r R,
        inputs: &'r mut InputRegistry,
        profile_id: &'r str,
        file: &'r SourcePath,
        start_line: u32,
        skip_only_if_eval: bool,
    ) -> Self {
        Self {
            rule,
            resources,
            inputs,
            profile_id,
            file,
            start_line,
            skip_only_if_eval,
        }
    }

    pub(crate) fn into_rule(self) -> Rule {
        self.rule
    }

    pub(crate) fn add_check(&mut self, check: Check) {
        self.rule.add_check(check);
    }

    pub fn id(&self) -> &str {
        &self.rule.id
    }

    pub fn resources(&self) -> &R {
        self.resources
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.rule.title = Some(title.into());
        self
    }

    pub fn desc(&mut self, text: impl Into<String>) -> &mut Self {
        self.rule.desc = Some(text.into());
        self
    }

    pub fn labeled_desc(
        &mut self,
        label: impl Into<String>,
        text: impl Into<String>,
    ) -> &mut Self {
        self.rule.descriptions.insert(label.into(), text.into());
        self
    }

    pub fn impact(&mut self, impact: f64) -> &mut Self {
        self.rule.set_impact(impact);
        self
    }

    pub fn tag(&mut self, name: impl Into<String>) -> &mut Self {
        self.rule.tags.insert(name.into(), Value::Null);
        self
    }

    pub fn tag_value(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.rule.tags.insert(name.into(), value.into());
        self
    }

    pub fn reference(&mut self, text: impl Into<String>) -> &mut Self {
        self.rule.add_reference(Reference {
            text: Some(text.into()),
            url: None,
        });
        self
    }

    pub fn reference_url(
        &mut self,
        text: impl Into<String>,
        url: impl Into<String>,
    ) -> &mut Self {
        self.rule.add_reference(Reference {
            text: Some(text.into()),
            url: Some(url.into()),
        });
        self
    }

    #[track_caller]
    pub fn describe(&mut self, args: impl IntoIterator<Item = Value>) -> &mut Self {
        let location = locate(self.file, self.start_line, Location::caller());
        let mut check = Check::new(CheckMethod::Describe, args);
        check.location = Some(location);
        self.rule.add_check(check);
        self
    }

    #[track_caller]
    pub fn expect(&mut self, args: impl IntoIterator<Item = Value>) -> &mut Self {
        let location = locate(self.file, self.start_line, Location::caller());
        let mut check = Check::new(CheckMethod::Expect, args);
        check.location = Some(location);
        self.rule.add_check(check);
        self
    }

    /// Grouped check that passes when any of its describes passes.
    #[track_caller]
    pub fn describe_one(&mut self, body: impl FnOnce(&mut DescribeOne)) -> &mut Self {
        let location = locate(self.file, self.start_line, Location::caller());
        let mut one = DescribeOne {
            file: self.file.clone(),
            start_line: self.start_line,
            children: Vec::new(),
        };
        body(&mut one);
        let mut check = Check::new(CheckMethod::DescribeOne, []);
        check.children = one.children;
        check.location = Some(location);
        self.rule.add_check(check);
        self
    }

    /// Skip this control only, unless only_if evaluation is disabled.
    pub fn only_if(
        &mut self,
        message: Option<&str>,
        condition: impl FnOnce(&R) -> bool,
    ) -> &mut Self {
        if self.skip_only_if_eval || self.rule.is_skipped() {
            return self;
        }
        if !condition(self.resources) {
            tracing::debug!(control = %self.rule.id, "only_if false, skipping control");
            self.rule.skip(message.unwrap_or(ids::DEFAULT_ONLY_IF_MESSAGE));
        }
        self
    }

    /// Same as the file-level `input`.
    #[track_caller]
    pub fn input(
        &mut self,
        name: &str,
        options: InputOptions,
    ) -> Result<Option<Value>, InputError> {
        let location = locate(self.file, self.start_line, Location::caller());
        crate::context::resolve_input(self.inputs, self.profile_id, name, options, location)
    }
}

/// Collects the alternatives of a `describe_one` group.
pub struct DescribeOne {
    file: SourcePath,
    start_line: u32,
    children: Vec<Check>,
}

impl DescribeOne {
    #[track_caller]
    pub fn describe(&mut self, args: impl IntoIterator<Item = Value>) -> &mut Self {
        let mut check = Check::new(CheckMethod::Describe, args);
        check.location = Some(locate(&self.file, self.start_line, Location::caller()));
        self.children.push(check);
        self
    }
}
