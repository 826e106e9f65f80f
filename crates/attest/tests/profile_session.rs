//! Control code querying a filter-table resource through the facade.

use attest::filter::{Expr, FilterFactory, FilterResource, FilterSchema, Record};
use attest::{
    CheckMethod, ContextOptions, ControlUnit, InputOptions, InputRegistry, InputType,
    ProfileContext, Severity, validate,
};
use serde_json::{Value, json};
use std::fmt;

struct Packages {
    schema: FilterSchema,
    rows: Vec<Record>,
}

impl Packages {
    fn installed() -> Self {
        let schema = FilterFactory::new()
            .add_accessor("where")
            .add_accessor("entries")
            .add_accessor("count")
            .add_field("names", "name")
            .add_field("versions", "version")
            .add("held")
            .connect()
            .unwrap();
        let rows = [
            json!({"name": "openssh-server", "version": "9.6", "held": false}),
            json!({"name": "telnetd", "version": "0.17", "held": false}),
            json!({"name": "openssl", "version": "3.0.13", "held": true}),
        ]
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
        Self { schema, rows }
    }
}

impl fmt::Display for Packages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Packages")
    }
}

impl FilterResource for Packages {
    fn filter_schema(&self) -> &FilterSchema {
        &self.schema
    }

    fn filter_rows(&self) -> Vec<Record> {
        self.rows.clone()
    }
}

#[test]
fn controls_describe_filtered_tables() {
    let mut inputs = InputRegistry::new();
    let mut ctx = ProfileContext::new(
        "pkg-baseline",
        Packages::installed(),
        &mut inputs,
        ContextOptions::default(),
    );

    ctx.load(ControlUnit::<Packages>::new("controls/packages.rs", 1, |ctx| {
        let banned = ctx
            .input(
                "banned",
                InputOptions::new().input_type(InputType::String).value("telnetd"),
            )?
            .unwrap_or(Value::Null);

        ctx.control("pkg-01", move |c| {
            c.title("No legacy remote shells").desc("telnetd must not be installed");
            let hits = c.resources().filter().where_([("name", banned)])?;
            c.expect([json!(hits.to_string()), json!(hits.count())]);
            Ok(())
        })?;

        ctx.control("pkg-02", |c| {
            c.title("Held packages are pinned").desc("Held packages are reviewed");
            let held = c.resources().filter().where_block(&Expr::field("held").eq(true))?;
            c.describe([json!(held.to_string())]);
            Ok(())
        })?;
        Ok(())
    }))
    .unwrap();

    let pkg_01 = ctx.registry().get("pkg-baseline/pkg-01").unwrap();
    assert_eq!(pkg_01.checks[0].method, CheckMethod::Expect);
    assert_eq!(
        pkg_01.checks[0].args,
        vec![json!("Packages with name == \"telnetd\""), json!(1)]
    );

    let pkg_02 = ctx.registry().get("pkg-baseline/pkg-02").unwrap();
    assert!(pkg_02.checks[0].args[0].as_str().unwrap().starts_with("Packages with "));

    let registry = ctx.into_registry();
    let validation = validate(&registry, &inputs, "pkg-baseline");
    assert!(validation.summary.valid);
    assert!(validation.findings.iter().all(|f| f.severity != Severity::Error));
}
