//! Property-based tests for input resolution.

use crate::{Event, Input, InputOptions, resolve};
use proptest::prelude::*;
use serde_json::json;

fn arb_sets() -> impl Strategy<Value = Vec<(i64, i32)>> {
    prop::collection::vec((any::<i64>(), -5i32..60), 0..16)
}

fn replay(sets: &[(i64, i32)]) -> Input {
    let mut input = Input::new("input", InputOptions::new()).unwrap();
    for (value, priority) in sets {
        input.update(Event::set(json!(value), *priority)).unwrap();
    }
    input
}

proptest! {
    #[test]
    fn replaying_the_same_history_yields_the_same_value(sets in arb_sets()) {
        let a = replay(&sets);
        let b = replay(&sets);
        prop_assert_eq!(a.value(), b.value());
        prop_assert_eq!(a.value(), resolve(a.events()));
    }

    #[test]
    fn winner_is_the_last_of_the_highest_priority(sets in arb_sets()) {
        let input = replay(&sets);
        let expected = sets
            .iter()
            .map(|(_, p)| *p)
            .max()
            .and_then(|top| sets.iter().rev().find(|(_, p)| *p == top))
            .map(|(v, _)| json!(v));
        prop_assert_eq!(input.value().cloned(), expected);
    }
}
