use crate::error::FilterAccessError;
use crate::table::{FieldArg, FieldOutput, FilterTable};
use crate::Record;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Computed accessor that replaces the default show/where behavior for one name.
pub type CustomAccessor =
    Arc<dyn Fn(&FilterTable, FieldArg) -> Result<FieldOutput, FilterAccessError> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Builtin {
    Where,
    Entries,
    Count,
    Exists,
    RawData,
}

impl Builtin {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "where" => Some(Builtin::Where),
            "entries" => Some(Builtin::Entries),
            "count" => Some(Builtin::Count),
            "exists" => Some(Builtin::Exists),
            "raw_data" => Some(Builtin::RawData),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub(crate) enum Accessor {
    Field {
        key: String,
        custom: Option<CustomAccessor>,
    },
    Builtin(Builtin),
}

/// Declares the accessors of a resource's filter table.
///
/// ```
/// use attest_filter::FilterFactory;
///
/// let schema = FilterFactory::new()
///     .add_accessor("where")
///     .add_accessor("entries")
///     .add_accessor("count")
///     .add_field("usernames", "username")
///     .add_field("uids", "uid")
///     .connect()
///     .unwrap();
/// assert!(schema.declares("uids"));
/// ```
#[derive(Default)]
pub struct FilterFactory {
    accessors: Vec<String>,
    fields: Vec<(String, String)>,
    custom: BTreeMap<String, CustomAccessor>,
}

impl FilterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose one of the table's built-in methods (`where`, `entries`, `count`, `exists`,
    /// `raw_data`) under its own name.
    pub fn add_accessor(mut self, name: impl Into<String>) -> Self {
        self.accessors.push(name.into());
        self
    }

    /// Field accessor whose name is also the record key.
    pub fn add(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.add_field(name.clone(), name)
    }

    /// Field accessor `name` reading record key `key`.
    pub fn add_field(mut self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.fields.push((name.into(), key.into()));
        self
    }

    /// Field accessor with computed behavior; `name` is also the record key.
    pub fn add_custom<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FilterTable, FieldArg) -> Result<FieldOutput, FilterAccessError>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        self.custom.insert(name.clone(), Arc::new(f));
        self.add(name)
    }

    /// Build the dispatch table. Unknown pass-through accessor names fail here, once.
    pub fn connect(self) -> Result<FilterSchema, FilterAccessError> {
        let mut dispatch = BTreeMap::new();
        for name in self.accessors {
            let builtin = Builtin::parse(&name).ok_or_else(|| FilterAccessError::UnknownAccessor {
                resource: "filter table".to_string(),
                name: name.clone(),
            })?;
            dispatch.insert(name, Accessor::Builtin(builtin));
        }

        let mut entry_fields: Vec<String> = Vec::new();
        let mut custom = self.custom;
        for (name, key) in self.fields {
            if !entry_fields.contains(&key) {
                entry_fields.push(key.clone());
            }
            let accessor = Accessor::Field {
                key,
                custom: custom.remove(&name),
            };
            dispatch.insert(name, accessor);
        }

        Ok(FilterSchema(Arc::new(SchemaInner {
            dispatch,
            entry_fields: entry_fields.into(),
        })))
    }
}

struct SchemaInner {
    dispatch: BTreeMap<String, Accessor>,
    entry_fields: Arc<[String]>,
}

/// The connected, immutable accessor table shared by every table of one resource type.
#[derive(Clone)]
pub struct FilterSchema(Arc<SchemaInner>);

impl FilterSchema {
    /// Unfiltered table over `rows`; `resource` is the display name used in descriptions.
    pub fn table(&self, resource: impl Into<String>, rows: Vec<Record>) -> FilterTable {
        FilterTable::new(self.clone(), resource.into(), rows)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.0.dispatch.contains_key(name)
    }

    /// Record keys carried by projected entries, in declaration order.
    pub fn entry_fields(&self) -> &Arc<[String]> {
        &self.0.entry_fields
    }

    pub(crate) fn accessor(&self, name: &str) -> Option<&Accessor> {
        self.0.dispatch.get(name)
    }

    pub(crate) fn has_key(&self, key: &str) -> bool {
        self.0.entry_fields.iter().any(|k| k == key)
    }

    /// Record key for a condition name: a declared key, or a field accessor's key.
    pub(crate) fn resolve_key<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.has_key(name) {
            return Some(name);
        }
        match self.0.dispatch.get(name) {
            Some(Accessor::Field { key, .. }) => Some(key.as_str()),
            _ => None,
        }
    }
}

impl fmt::Debug for FilterSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSchema")
            .field("accessors", &self.0.dispatch.keys().collect::<Vec<_>>())
            .field("entry_fields", &self.0.entry_fields)
            .finish()
    }
}
