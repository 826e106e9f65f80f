use crate::rule::Rule;
use attest_types::{SourceLocation, SourcePath};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// What [`RuleRegistry::register`] did with a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    Inserted,
    /// Same full id was live; the new rule was merged into it.
    Merged,
    /// Same full id was tombstoned; the slot now holds the new rule.
    Revived,
}

/// Record of a full id registered more than once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateControl {
    pub full_id: String,
    pub first: Option<SourceLocation>,
    pub duplicate: Option<SourceLocation>,
}

/// Controls grouped by the file they were loaded from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    pub headers: BTreeMap<String, String>,
    /// Full ids, first-registration order.
    pub controls: Vec<String>,
}

impl Group {
    pub fn title(&self) -> Option<&str> {
        self.headers.get("title").map(String::as_str)
    }
}

/// Canonical per-session store of controls: full id → rule, or `None` for a tombstone.
#[derive(Clone, Debug, Default)]
pub struct RuleRegistry {
    rules: IndexMap<String, Option<Rule>>,
    duplicates: Vec<DuplicateControl>,
    groups: IndexMap<SourcePath, Group>,
    current: Option<SourcePath>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start attributing headers and registrations to `file`.
    pub fn begin_load(&mut self, file: SourcePath) {
        self.groups.entry(file.clone()).or_default();
        self.current = Some(file);
    }

    pub fn current_file(&self) -> Option<&SourcePath> {
        self.current.as_ref()
    }

    /// Attach a header (e.g. `title`) to the file currently being loaded.
    pub fn set_header(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let file = self.current.clone().unwrap_or_default();
        self.groups
            .entry(file)
            .or_default()
            .headers
            .insert(field.into(), value.into());
    }

    pub fn header(&self, field: &str) -> Option<&str> {
        let file = self.current.as_ref()?;
        self.groups.get(file)?.headers.get(field).map(String::as_str)
    }

    /// Insert, merge, or revive. `None` is ignored.
    pub fn register(&mut self, rule: impl Into<Option<Rule>>) -> Option<Registration> {
        let rule = rule.into()?;
        let full_id = rule.full_id();

        let file = rule
            .location
            .as_ref()
            .map(|l| l.path.clone())
            .or_else(|| self.current.clone())
            .unwrap_or_default();
        let group = self.groups.entry(file).or_default();
        if !group.controls.contains(&full_id) {
            group.controls.push(full_id.clone());
        }

        match self.rules.get_mut(&full_id) {
            Some(Some(existing)) => {
                tracing::debug!(control = %full_id, "merging duplicate control");
                self.duplicates.push(DuplicateControl {
                    full_id: full_id.clone(),
                    first: existing.location.clone(),
                    duplicate: rule.location.clone(),
                });
                existing.merge(rule);
                Some(Registration::Merged)
            }
            Some(slot) => {
                tracing::debug!(control = %full_id, "replacing tombstoned control");
                *slot = Some(rule);
                Some(Registration::Revived)
            }
            None => {
                tracing::debug!(control = %full_id, "registering control");
                self.rules.insert(full_id, Some(rule));
                Some(Registration::Inserted)
            }
        }
    }

    /// Tombstone `full_id`. The key stays so the slot keeps its position.
    pub fn unregister(&mut self, full_id: &str) {
        tracing::debug!(control = %full_id, "tombstoning control");
        match self.rules.get_mut(full_id) {
            Some(slot) => *slot = None,
            None => {
                self.rules.insert(full_id.to_string(), None);
            }
        }
    }

    pub fn get(&self, full_id: &str) -> Option<&Rule> {
        self.rules.get(full_id).and_then(Option::as_ref)
    }

    pub fn is_tombstoned(&self, full_id: &str) -> bool {
        matches!(self.rules.get(full_id), Some(None))
    }

    /// Every slot including tombstones, insertion order.
    pub fn all_rules(&self) -> &IndexMap<String, Option<Rule>> {
        &self.rules
    }

    /// Live rules, insertion order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules
            .iter()
            .filter_map(|(id, slot)| slot.as_ref().map(|r| (id.as_str(), r)))
    }

    pub fn live_count(&self) -> usize {
        self.rules.values().filter(|slot| slot.is_some()).count()
    }

    /// Live rules whose local id is in `include`; an empty list keeps everything.
    pub fn filter(&self, include: &[&str]) -> Vec<&Rule> {
        self.rules()
            .map(|(_, r)| r)
            .filter(|r| include.is_empty() || include.contains(&r.id.as_str()))
            .collect()
    }

    /// Skip every live rule that was defined in `file`.
    pub fn skip_from_file(&mut self, file: &SourcePath, message: &str) -> usize {
        let mut skipped = 0;
        for rule in self.rules.values_mut().flatten() {
            if rule.location.as_ref().is_some_and(|l| &l.path == file) {
                rule.skip(message);
                skipped += 1;
            }
        }
        skipped
    }

    pub fn duplicates(&self) -> &[DuplicateControl] {
        &self.duplicates
    }

    pub fn groups(&self) -> &IndexMap<SourcePath, Group> {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Check, CheckMethod};
    use serde_json::json;

    fn rule(id: &str, file: &str, checks: usize) -> Rule {
        let mut r = Rule::new(id, Some("p"));
        r.location = Some(SourceLocation::new(file, 1));
        for i in 0..checks {
            r.add_check(Check::new(CheckMethod::Describe, [json!(i)]));
        }
        r
    }

    #[test]
    fn nil_registration_is_a_no_op() {
        let mut reg = RuleRegistry::new();
        assert_eq!(reg.register(None), None);
        assert!(reg.all_rules().is_empty());
    }

    #[test]
    fn duplicate_registration_merges_and_warns() {
        let mut reg = RuleRegistry::new();
        assert_eq!(reg.register(rule("1", "a.rs", 2)), Some(Registration::Inserted));
        assert_eq!(reg.register(rule("1", "a.rs", 3)), Some(Registration::Merged));
        assert_eq!(reg.get("p/1").unwrap().checks.len(), 5);
        assert_eq!(reg.duplicates().len(), 1);
        assert_eq!(reg.duplicates()[0].full_id, "p/1");
    }

    #[test]
    fn tombstones_keep_their_slot() {
        let mut reg = RuleRegistry::new();
        reg.register(rule("1", "a.rs", 1));
        reg.register(rule("2", "a.rs", 1));
        reg.unregister("p/1");

        assert!(reg.is_tombstoned("p/1"));
        assert!(reg.get("p/1").is_none());
        assert_eq!(reg.all_rules().len(), 2);
        assert_eq!(reg.live_count(), 1);

        assert_eq!(reg.register(rule("1", "a.rs", 1)), Some(Registration::Revived));
        let order: Vec<&str> = reg.rules().map(|(id, _)| id).collect();
        assert_eq!(order, vec!["p/1", "p/2"]);
    }

    #[test]
    fn unregistering_an_unknown_id_leaves_a_tombstone() {
        let mut reg = RuleRegistry::new();
        reg.unregister("p/ghost");
        assert!(reg.is_tombstoned("p/ghost"));
        assert_eq!(reg.live_count(), 0);
    }

    #[test]
    fn headers_attach_to_the_current_file() {
        let mut reg = RuleRegistry::new();
        reg.begin_load(SourcePath::new("controls/ssh.rs"));
        reg.set_header("title", "SSH Server");
        reg.register(rule("1", "controls/ssh.rs", 1));
        reg.begin_load(SourcePath::new("controls/users.rs"));
        reg.register(rule("2", "controls/users.rs", 1));

        assert_eq!(reg.header("title"), None);
        let ssh = &reg.groups()[&SourcePath::new("controls/ssh.rs")];
        assert_eq!(ssh.title(), Some("SSH Server"));
        assert_eq!(ssh.controls, vec!["p/1".to_string()]);
    }

    #[test]
    fn filter_selects_by_local_id() {
        let mut reg = RuleRegistry::new();
        reg.register(rule("a", "f.rs", 0));
        reg.register(rule("b", "f.rs", 0));
        reg.register(rule("c", "f.rs", 0));
        let ids: Vec<&str> = reg.filter(&["c", "a"]).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(reg.filter(&[]).len(), 3);
    }
}
