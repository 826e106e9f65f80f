//! Filter tables: a reusable query/projection layer for resource collections.
//!
//! A resource declares its columns once on a [`FilterFactory`]; [`FilterFactory::connect`]
//! turns the declaration into a [`FilterSchema`], a dispatch table from accessor name to
//! behavior. Every [`FilterTable`] built from that schema answers:
//!
//! - `<field>` with no argument: the flattened values of that column
//! - `<field>` with a condition: `where_(field => condition)`
//! - `<field>` with an [`Expr`]: block-form filtering
//! - `where`, `entries`, `count`, `exists`, `raw_data` when declared as pass-through accessors
//!
//! Filtering only ever narrows: rows are never reordered, deduplicated, or added back.

#![forbid(unsafe_code)]

mod condition;
mod error;
mod expr;
mod factory;
mod table;

#[cfg(test)]
mod proptest;

pub use condition::{Condition, Matchable};
pub use error::FilterAccessError;
pub use expr::{CompareOp, Expr, Method};
pub use factory::{CustomAccessor, FilterFactory, FilterSchema};
pub use table::{FieldArg, FieldOutput, FilterEntry, FilterTable};

/// One row of a resource collection: field name → scalar or collection value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Implemented by resource types whose collection data is exposed through a filter table.
pub trait FilterResource: std::fmt::Display {
    fn filter_schema(&self) -> &FilterSchema;

    fn filter_rows(&self) -> Vec<Record>;

    /// Fresh, unfiltered table over the resource's current rows.
    fn filter(&self) -> FilterTable {
        self.filter_schema()
            .table(self.to_string(), self.filter_rows())
    }

    /// Dispatch a declared accessor by name against the unfiltered table.
    fn accessor(&self, name: &str, arg: FieldArg) -> Result<FieldOutput, FilterAccessError> {
        self.filter().call(name, arg)
    }
}
