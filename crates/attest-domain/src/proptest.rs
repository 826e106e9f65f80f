//! Property-based tests for control registration.
//!
//! - ids registered in any order keep first-registration order
//! - duplicate registrations merge every check into one rule
//! - tombstoned ids never appear among live rules
//! - impact always lands in [0, 1]

use crate::registry::RuleRegistry;
use crate::rule::{Check, CheckMethod, Rule};
use proptest::prelude::*;
use serde_json::json;

fn arb_id() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,8}").unwrap()
}

fn rule(id: &str, checks: usize) -> Rule {
    let mut r = Rule::new(id, Some("p"));
    for i in 0..checks {
        r.add_check(Check::new(CheckMethod::Expect, [json!(i)]));
    }
    r
}

proptest! {
    #[test]
    fn first_registration_order_is_kept(ids in prop::collection::vec(arb_id(), 0..20)) {
        let mut reg = RuleRegistry::new();
        for id in &ids {
            reg.register(rule(id, 0));
        }
        let mut expected: Vec<String> = Vec::new();
        for id in &ids {
            let full = format!("p/{id}");
            if !expected.contains(&full) {
                expected.push(full);
            }
        }
        let got: Vec<String> = reg.rules().map(|(id, _)| id.to_string()).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn duplicates_accumulate_checks(counts in prop::collection::vec(0usize..4, 1..6)) {
        let mut reg = RuleRegistry::new();
        for n in &counts {
            reg.register(rule("dup", *n));
        }
        let total: usize = counts.iter().sum();
        prop_assert_eq!(reg.get("p/dup").unwrap().checks.len(), total);
        prop_assert_eq!(reg.duplicates().len(), counts.len() - 1);
    }

    #[test]
    fn tombstones_are_never_live(
        ids in prop::collection::vec(arb_id(), 1..10),
        drop in prop::collection::vec(any::<bool>(), 10),
    ) {
        let mut reg = RuleRegistry::new();
        for id in &ids {
            reg.register(rule(id, 1));
        }
        let mut dropped = Vec::new();
        for (id, d) in ids.iter().zip(&drop) {
            if *d {
                reg.unregister(&format!("p/{id}"));
                dropped.push(format!("p/{id}"));
            }
        }
        for (id, _) in reg.rules() {
            prop_assert!(!dropped.iter().any(|d| d == id));
        }
    }

    #[test]
    fn impact_is_clamped(impact in any::<f64>()) {
        let mut r = Rule::new("x", None);
        r.set_impact(impact);
        let got = r.impact().unwrap();
        prop_assert!((0.0..=1.0).contains(&got));
    }
}
