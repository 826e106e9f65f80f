//! Fuzz target for filter table conditions.
//!
//! Goal: `where_` and block filters should **never panic**, whatever the row values and
//! conditions, and a filtered table never holds more rows than its source.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_filter_conditions
//! ```

#![no_main]

use arbitrary::Arbitrary;
use attest_filter::{Condition, Expr, FilterFactory, Record};
use libfuzzer_sys::fuzz_target;
use serde_json::{Value, json};

#[derive(Arbitrary, Debug)]
enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl Cell {
    fn to_value(&self) -> Value {
        match self {
            Cell::Int(v) => json!(v),
            Cell::Float(v) => json!(v),
            Cell::Text(s) => json!(s),
            Cell::Flag(b) => json!(b),
            Cell::List(items) => json!(items),
        }
    }
}

#[derive(Arbitrary, Debug)]
enum Cond {
    Int(i64),
    Float(f64),
    Text(String),
    Pattern(String),
    Range(i64, i64),
}

#[derive(Arbitrary, Debug)]
struct FilterInput {
    rows: Vec<(Cell, Cell)>,
    conditions: Vec<(bool, Cond)>,
    needle: String,
}

fn condition(cond: &Cond) -> Option<Condition> {
    Some(match cond {
        Cond::Int(v) => Condition::from(*v),
        Cond::Float(v) => Condition::from(*v),
        Cond::Text(s) => Condition::from(s.as_str()),
        Cond::Pattern(p) => Condition::from(regex::Regex::new(p).ok()?),
        Cond::Range(a, b) => Condition::from(*a.min(b)..=*a.max(b)),
    })
}

fuzz_target!(|input: FilterInput| {
    if input.rows.len() > 64 || input.conditions.len() > 8 || input.needle.len() > 64 {
        return;
    }
    let Ok(schema) = FilterFactory::new()
        .add_accessor("where")
        .add_field("names", "name")
        .add("value")
        .connect()
    else {
        return;
    };

    let rows: Vec<Record> = input
        .rows
        .iter()
        .map(|(name, value)| {
            let mut row = Record::new();
            row.insert("name".into(), name.to_value());
            row.insert("value".into(), value.to_value());
            row
        })
        .collect();
    let table = schema.table("Fuzz", rows);

    let conditions: Vec<(&str, Condition)> = input
        .conditions
        .iter()
        .filter_map(|(on_name, cond)| {
            let key = if *on_name { "name" } else { "value" };
            condition(cond).map(|c| (key, c))
        })
        .collect();
    if let Ok(narrowed) = table.where_(conditions) {
        assert!(narrowed.count() <= table.count());
        let _ = narrowed.to_string();
        let _ = narrowed.entries();
    }

    let block = Expr::field("name")
        .includes(input.needle.as_str())
        .or(!Expr::field("value").empty());
    if let Ok(narrowed) = table.where_block(&block) {
        assert!(narrowed.count() <= table.count());
        let _ = narrowed.to_string();
    }
});
