use attest_types::{SourceLocation, ids};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMethod {
    Describe,
    DescribeOne,
    Expect,
}

/// An assertion spec recorded on a rule. Execution belongs to the test runner.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Check {
    pub method: CheckMethod,
    pub args: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Check>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Check {
    pub fn new(method: CheckMethod, args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            method,
            args: args.into_iter().collect(),
            children: Vec::new(),
            location: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Reference {
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A control. Identity is `(profile_id, id)`; see [`Rule::full_id`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Rule {
    pub id: String,
    pub profile_id: Option<String>,
    pub title: Option<String>,
    pub desc: Option<String>,
    /// Labelled descriptions, in declaration order.
    pub descriptions: IndexMap<String, String>,
    impact: Option<f64>,
    /// Bare tags carry `null`.
    pub tags: IndexMap<String, Value>,
    pub refs: Vec<Reference>,
    pub checks: Vec<Check>,
    pub location: Option<SourceLocation>,
    pub group_title: Option<String>,
    skipped: bool,
    skip_message: Option<String>,
}

impl Rule {
    pub fn new(id: impl Into<String>, profile_id: Option<&str>) -> Self {
        Self {
            id: id.into(),
            profile_id: profile_id.filter(|p| !p.is_empty()).map(str::to_string),
            ..Self::default()
        }
    }

    /// `<profile_id>/<id>`, or just `<id>` without a profile.
    pub fn full_id(&self) -> String {
        full_id(self.profile_id.as_deref(), &self.id)
    }

    pub fn is_generated(&self) -> bool {
        self.id.starts_with(ids::GENERATED_ID_PREFIX)
    }

    pub fn has_blank_id(&self) -> bool {
        self.id.trim().is_empty()
    }

    pub fn impact(&self) -> Option<f64> {
        self.impact
    }

    /// Stored clamped to `[0.0, 1.0]`; NaN reads as 0.
    pub fn set_impact(&mut self, impact: f64) {
        self.impact = Some(if impact.is_nan() {
            0.0
        } else {
            impact.clamp(0.0, 1.0)
        });
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    pub fn skip_message(&self) -> Option<&str> {
        self.skip_message.as_deref()
    }

    /// Mark skipped and drop all checks. The first skip reason is kept.
    pub fn skip(&mut self, message: impl Into<String>) {
        if !self.skipped {
            self.skipped = true;
            self.skip_message = Some(message.into());
        }
        self.checks.clear();
    }

    pub fn add_check(&mut self, check: Check) {
        if !self.skipped {
            self.checks.push(check);
        }
    }

    pub fn add_reference(&mut self, reference: Reference) {
        if !self.refs.contains(&reference) {
            self.refs.push(reference);
        }
    }

    /// Fold a later registration of the same control into this one.
    ///
    /// Checks are concatenated, tags and refs unioned, and the later scalars win
    /// where they are set. Skipping only ever spreads.
    pub fn merge(&mut self, later: Rule) {
        let Rule {
            title,
            desc,
            descriptions,
            impact,
            tags,
            refs,
            checks,
            group_title,
            skipped,
            skip_message,
            ..
        } = later;

        if title.is_some() {
            self.title = title;
        }
        if desc.is_some() {
            self.desc = desc;
        }
        if impact.is_some() {
            self.impact = impact;
        }
        if group_title.is_some() && self.group_title.is_none() {
            self.group_title = group_title;
        }
        self.descriptions.extend(descriptions);
        self.tags.extend(tags);
        for r in refs {
            self.add_reference(r);
        }
        for c in checks {
            self.add_check(c);
        }
        if skipped {
            self.skip(skip_message.unwrap_or_else(|| ids::DEFAULT_ONLY_IF_MESSAGE.to_string()));
        }
    }
}

pub fn full_id(profile_id: Option<&str>, id: &str) -> String {
    match profile_id {
        Some(p) if !p.is_empty() => format!("{p}/{id}"),
        _ => id.to_string(),
    }
}
