//! Property-based tests for filter tables.
//!
//! These cover the narrowing invariants: filtering never adds rows, never
//! reorders them, and chaining is the same as conjunction.

use crate::{Condition, Expr, FilterFactory, FilterSchema, Record};
use proptest::prelude::*;
use serde_json::{Value, json};

fn schema() -> FilterSchema {
    FilterFactory::new()
        .add_accessor("where")
        .add_accessor("entries")
        .add("id")
        .add("uid")
        .add("shell")
        .connect()
        .expect("schema should connect")
}

fn arb_shell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/bin/bash".to_string()),
        Just("/bin/zsh".to_string()),
        Just("/usr/sbin/nologin".to_string()),
    ]
}

fn arb_rows() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((0i64..5, arb_shell()), 0..24).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (uid, shell))| {
                let mut row = Record::new();
                row.insert("id".to_string(), json!(i));
                row.insert("uid".to_string(), json!(uid));
                row.insert("shell".to_string(), json!(shell));
                row
            })
            .collect()
    })
}

fn ids(rows: &[Record]) -> Vec<Value> {
    rows.iter().map(|r| r["id"].clone()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn where_yields_an_ordered_subsequence(rows in arb_rows(), uid in 0i64..5) {
        let table = schema().table("users", rows.clone());
        let narrowed = table.where_([("uid", uid)]).unwrap();

        prop_assert!(narrowed.count() <= table.count());
        let expected: Vec<Value> = rows
            .iter()
            .filter(|r| r["uid"] == json!(uid))
            .map(|r| r["id"].clone())
            .collect();
        prop_assert_eq!(ids(narrowed.rows()), expected);
    }

    #[test]
    fn chained_where_equals_conjunction(rows in arb_rows(), uid in 0i64..5, shell in arb_shell()) {
        let table = schema().table("users", rows);
        let chained = table
            .where_([("uid", uid)])
            .unwrap()
            .where_([("shell", shell.clone())])
            .unwrap();
        let combined = table
            .where_([("uid", Condition::from(uid)), ("shell", Condition::from(shell))])
            .unwrap();

        prop_assert_eq!(chained.rows(), combined.rows());
        prop_assert_eq!(chained.to_string(), combined.to_string());
    }

    #[test]
    fn block_filter_matches_manual_selection(rows in arb_rows(), floor in 0i64..5) {
        let table = schema().table("users", rows.clone());
        let expr = Expr::field("uid").ge(floor);
        let narrowed = table.where_block(&expr).unwrap();

        let expected: Vec<Value> = rows
            .iter()
            .filter(|r| r["uid"].as_i64().is_some_and(|u| u >= floor))
            .map(|r| r["id"].clone())
            .collect();
        prop_assert_eq!(ids(narrowed.rows()), expected);
    }

    #[test]
    fn entries_preserve_row_order(rows in arb_rows()) {
        let table = schema().table("users", rows.clone());
        let entries = table.entries();
        prop_assert_eq!(entries.len(), rows.len());
        for (entry, row) in entries.iter().zip(&rows) {
            prop_assert_eq!(entry.get("id").unwrap(), &row["id"]);
        }
    }
}
