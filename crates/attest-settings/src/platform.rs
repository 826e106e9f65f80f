use crate::model::SupportEntry;
use anyhow::Context;
use globset::{Glob, GlobMatcher};

/// The host a profile is loaded for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Platform {
    pub name: String,
    /// Family chain, most specific first (`debian`, `linux`, `unix`).
    pub families: Vec<String>,
    pub release: String,
}

impl Platform {
    pub fn new(name: impl Into<String>, release: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            families: Vec::new(),
            release: release.into(),
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.families.push(family.into());
        self
    }

    /// `<name>/<release>`, as shown in skip messages.
    pub fn label(&self) -> String {
        format!("{}/{}", self.name, self.release)
    }

    fn is_or_belongs_to(&self, family: &str) -> bool {
        self.name.eq_ignore_ascii_case(family)
            || self.families.iter().any(|f| f.eq_ignore_ascii_case(family))
    }
}

pub(crate) struct CompiledSupport {
    platform: Option<String>,
    family: Option<String>,
    name: Option<GlobMatcher>,
    release: Option<GlobMatcher>,
}

impl CompiledSupport {
    pub(crate) fn compile(index: usize, entry: &SupportEntry) -> anyhow::Result<Self> {
        let glob = |pattern: &Option<String>, key: &str| -> anyhow::Result<Option<GlobMatcher>> {
            pattern
                .as_deref()
                .map(|p| {
                    Glob::new(p)
                        .map(|g| g.compile_matcher())
                        .with_context(|| format!("invalid {key} glob in supports[{index}]: {p}"))
                })
                .transpose()
        };
        Ok(Self {
            platform: entry.platform.clone(),
            family: entry.platform_family.clone(),
            name: glob(&entry.platform_name, "platform-name")?,
            release: glob(&entry.release, "release")?,
        })
    }

    pub(crate) fn matches(&self, host: &Platform) -> bool {
        self.platform.as_deref().is_none_or(|p| host.is_or_belongs_to(p))
            && self
                .family
                .as_deref()
                .is_none_or(|f| host.families.iter().any(|hf| hf.eq_ignore_ascii_case(f)))
            && self.name.as_ref().is_none_or(|g| g.is_match(&host.name))
            && self.release.as_ref().is_none_or(|g| g.is_match(&host.release))
    }
}

/// Whether any entry admits `host`. No entries admits everything.
pub(crate) fn supports(entries: &[CompiledSupport], host: &Platform) -> bool {
    entries.is_empty() || entries.iter().any(|e| e.matches(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ubuntu() -> Platform {
        Platform::new("ubuntu", "22.04")
            .with_family("debian")
            .with_family("linux")
            .with_family("unix")
    }

    fn entry(f: impl FnOnce(&mut SupportEntry)) -> CompiledSupport {
        let mut e = SupportEntry::default();
        f(&mut e);
        CompiledSupport::compile(0, &e).unwrap()
    }

    #[test]
    fn no_entries_supports_everything() {
        assert!(supports(&[], &ubuntu()));
    }

    #[test]
    fn platform_matches_name_or_family() {
        assert!(entry(|e| e.platform = Some("linux".into())).matches(&ubuntu()));
        assert!(entry(|e| e.platform = Some("Ubuntu".into())).matches(&ubuntu()));
        assert!(!entry(|e| e.platform = Some("windows".into())).matches(&ubuntu()));
    }

    #[test]
    fn family_ignores_the_name() {
        assert!(entry(|e| e.platform_family = Some("debian".into())).matches(&ubuntu()));
        assert!(!entry(|e| e.platform_family = Some("ubuntu".into())).matches(&ubuntu()));
    }

    #[test]
    fn name_and_release_are_globs() {
        let e = entry(|e| {
            e.platform_name = Some("ubu*".into());
            e.release = Some("22.*".into());
        });
        assert!(e.matches(&ubuntu()));
        assert!(!e.matches(&Platform::new("ubuntu", "20.04")));
    }

    #[test]
    fn bad_globs_are_reported() {
        let e = SupportEntry {
            release: Some("[".into()),
            ..SupportEntry::default()
        };
        let err = CompiledSupport::compile(3, &e).err().unwrap();
        assert!(err.to_string().contains("supports[3]"));
    }

    #[test]
    fn label_joins_name_and_release() {
        assert_eq!(ubuntu().label(), "ubuntu/22.04");
    }
}
