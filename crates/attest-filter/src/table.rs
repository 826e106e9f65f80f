use crate::condition::Condition;
use crate::error::FilterAccessError;
use crate::expr::Expr;
use crate::factory::{Accessor, Builtin, FilterSchema};
use crate::Record;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Argument shape of an accessor call.
#[derive(Clone, Debug)]
pub enum FieldArg {
    /// No argument: list the column.
    Show,
    Condition(Condition),
    Block(Expr),
}

#[derive(Clone, Debug)]
pub enum FieldOutput {
    Values(Vec<Value>),
    Table(FilterTable),
    Entries(Vec<FilterEntry>),
    Count(usize),
    Bool(bool),
    Rows(Vec<Record>),
    Value(Value),
}

#[derive(Clone, Debug)]
pub struct FilterTable {
    schema: FilterSchema,
    resource: Arc<str>,
    rows: Vec<Record>,
    filters: String,
}

impl FilterTable {
    pub(crate) fn new(schema: FilterSchema, resource: String, rows: Vec<Record>) -> Self {
        Self {
            schema,
            resource: resource.into(),
            rows,
            filters: " with".to_string(),
        }
    }

    fn narrowed(&self, rows: Vec<Record>, filters: &str) -> Self {
        Self {
            schema: self.schema.clone(),
            resource: Arc::clone(&self.resource),
            rows,
            filters: format!("{}{}", self.filters, filters),
        }
    }

    /// Dispatch a declared accessor by name.
    pub fn call(&self, name: &str, arg: FieldArg) -> Result<FieldOutput, FilterAccessError> {
        let accessor = self
            .schema
            .accessor(name)
            .ok_or_else(|| FilterAccessError::UnknownAccessor {
                resource: self.resource.to_string(),
                name: name.to_string(),
            })?;

        match accessor {
            Accessor::Field {
                custom: Some(f), ..
            } => f(self, arg),
            Accessor::Field { key, custom: None } => match arg {
                FieldArg::Show => self.get_fields(&[key.as_str()]).map(FieldOutput::Values),
                FieldArg::Condition(c) => self.where_([(key.as_str(), c)]).map(FieldOutput::Table),
                FieldArg::Block(expr) => self.where_block(&expr).map(FieldOutput::Table),
            },
            Accessor::Builtin(builtin) => self.call_builtin(name, *builtin, arg),
        }
    }

    fn call_builtin(
        &self,
        name: &str,
        builtin: Builtin,
        arg: FieldArg,
    ) -> Result<FieldOutput, FilterAccessError> {
        let unsupported = |arg: &'static str| FilterAccessError::UnsupportedArgument {
            name: name.to_string(),
            arg,
        };
        match (builtin, arg) {
            (Builtin::Where, FieldArg::Show) => Ok(FieldOutput::Table(self.clone())),
            (Builtin::Where, FieldArg::Block(expr)) => {
                self.where_block(&expr).map(FieldOutput::Table)
            }
            (Builtin::Where, FieldArg::Condition(_)) => Err(unsupported("a bare condition")),
            (_, FieldArg::Condition(_)) => Err(unsupported("a condition")),
            (_, FieldArg::Block(_)) => Err(unsupported("a block")),
            (Builtin::Entries, FieldArg::Show) => Ok(FieldOutput::Entries(self.entries())),
            (Builtin::Count, FieldArg::Show) => Ok(FieldOutput::Count(self.count())),
            (Builtin::Exists, FieldArg::Show) => Ok(FieldOutput::Bool(self.exists())),
            (Builtin::RawData, FieldArg::Show) => Ok(FieldOutput::Rows(self.rows.clone())),
        }
    }

    /// `<field>()`: flattened values of the column across the current rows.
    pub fn field(&self, name: &str) -> Result<Vec<Value>, FilterAccessError> {
        match self.call(name, FieldArg::Show)? {
            FieldOutput::Values(values) => Ok(values),
            _ => Err(unexpected(name, "a list of values")),
        }
    }

    /// `<field>(condition)`: same as `where_([(field, condition)])`.
    pub fn field_matching(
        &self,
        name: &str,
        condition: impl Into<Condition>,
    ) -> Result<FilterTable, FilterAccessError> {
        match self.call(name, FieldArg::Condition(condition.into()))? {
            FieldOutput::Table(t) => Ok(t),
            _ => Err(unexpected(name, "a filter table")),
        }
    }

    /// `<field> { block }`: block-form filter.
    pub fn field_where(&self, name: &str, expr: Expr) -> Result<FilterTable, FilterAccessError> {
        match self.call(name, FieldArg::Block(expr))? {
            FieldOutput::Table(t) => Ok(t),
            _ => Err(unexpected(name, "a filter table")),
        }
    }

    /// Keep rows matching every condition. Rows lacking a condition's key are dropped.
    pub fn where_<I, K, C>(&self, conditions: I) -> Result<FilterTable, FilterAccessError>
    where
        I: IntoIterator<Item = (K, C)>,
        K: AsRef<str>,
        C: Into<Condition>,
    {
        let mut rows = self.rows.clone();
        let mut filters = String::new();
        for (name, condition) in conditions {
            let name = name.as_ref();
            let key =
                self.schema
                    .resolve_key(name)
                    .ok_or_else(|| FilterAccessError::UnknownField {
                        resource: self.resource.to_string(),
                        field: name.to_string(),
                    })?;
            let condition = condition.into();
            filters.push_str(&format!(" {key} == {}", condition.inspect()));
            rows.retain(|row| row.get(key).is_some_and(|v| condition.matches(v)));
        }
        tracing::trace!(resource = %self.resource, filters = %filters, kept = rows.len(), "where");
        Ok(self.narrowed(rows, &filters))
    }

    /// Keep rows for which `expr` is truthy. Fields are record keys.
    pub fn where_block(&self, expr: &Expr) -> Result<FilterTable, FilterAccessError> {
        if let Some(field) = expr.fields().into_iter().find(|f| !self.schema.has_key(f)) {
            return Err(FilterAccessError::UnknownField {
                resource: self.resource.to_string(),
                field: field.to_string(),
            });
        }
        let rows: Vec<Record> = self.rows.iter().filter(|row| expr.test(row)).cloned().collect();
        let filters = format!(" {expr}");
        tracing::trace!(
            resource = %self.resource,
            filters = %filters,
            kept = rows.len(),
            "where block"
        );
        Ok(self.narrowed(rows, &filters))
    }

    /// One projected entry per row, restricted to declared fields.
    pub fn entries(&self) -> Vec<FilterEntry> {
        let description = format!("{self} one entry");
        let fields = self.schema.entry_fields();
        self.rows
            .iter()
            .map(|row| FilterEntry {
                fields: Arc::clone(fields),
                values: fields
                    .iter()
                    .map(|k| row.get(k).cloned().unwrap_or(Value::Null))
                    .collect(),
                filter: description.clone(),
            })
            .collect()
    }

    /// Values of `keys` for every row, arrays flattened. Every key must be declared.
    pub fn get_fields(&self, keys: &[&str]) -> Result<Vec<Value>, FilterAccessError> {
        if let Some(key) = keys.iter().find(|k| !self.schema.has_key(k)) {
            return Err(FilterAccessError::UnknownField {
                resource: self.resource.to_string(),
                field: key.to_string(),
            });
        }
        let mut out = Vec::new();
        for row in &self.rows {
            for key in keys {
                flatten_into(row.get(*key).cloned().unwrap_or(Value::Null), &mut out);
            }
        }
        Ok(out)
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn exists(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Accumulated predicate text, starting with ` with`.
    pub fn filters(&self) -> &str {
        &self.filters
    }
}

impl fmt::Display for FilterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.resource, self.filters)
    }
}

fn unexpected(name: &str, expected: &'static str) -> FilterAccessError {
    FilterAccessError::UnexpectedOutput {
        name: name.to_string(),
        expected,
    }
}

fn flatten_into(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        other => out.push(other),
    }
}

/// A projected row. The filter description is for display only.
#[derive(Clone, Debug)]
pub struct FilterEntry {
    fields: Arc<[String]>,
    values: Vec<Value>,
    filter: String,
}

impl FilterEntry {
    pub fn get(&self, field: &str) -> Result<&Value, FilterAccessError> {
        self.fields
            .iter()
            .position(|f| f == field)
            .map(|i| &self.values[i])
            .ok_or_else(|| FilterAccessError::UnknownField {
                resource: self.filter.clone(),
                field: field.to_string(),
            })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn filter_description(&self) -> &str {
        &self.filter
    }

    pub fn to_record(&self) -> Record {
        self.fields
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }
}

impl PartialEq for FilterEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields && self.values == other.values
    }
}

impl fmt::Display for FilterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filter)
    }
}
