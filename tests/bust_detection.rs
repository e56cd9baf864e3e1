use std::cmp::Ordering;

use hashbrown::HashSet;
use proptest::prelude::*;

use scpgen::call::{is_bust, is_plausible, normalize, possible_busts, scp_order};

#[test]
fn lengths_differing_by_two_are_never_busts() {
    assert!(!is_bust("K1ABC", "K1ABCDE"));
    assert!(!is_bust("K1ABCDE", "K1ABC"));
}

#[test]
fn insertion_and_substitution_are_busts() {
    assert!(is_bust("W1AW", "W1AWW")); // extra trailing character
    assert!(is_bust("W1AW", "WW1AW")); // extra leading character
    assert!(is_bust("W1AW", "W1AX")); // single substitution
    assert!(is_bust("K1ABC", "K1BC")); // interior character dropped
}

#[test]
fn adjacent_swap_is_a_bust_but_scramble_is_not() {
    assert!(is_bust("N7DR", "N7RD"));
    assert!(!is_bust("N7DR", "DR7N"));
}

#[test]
fn two_nonadjacent_substitutions_are_not_a_bust() {
    assert!(!is_bust("K1ABC", "K2ABX"));
}

#[test]
fn identical_calls_are_not_busts() {
    assert!(!is_bust("N7DR", "N7DR"));
}

#[test]
fn possible_busts_is_symmetric_and_skips_clean_calls() {
    let calls: HashSet<String> = ["N7DR", "N7RD", "K1ABC"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let busts = possible_busts(&calls);

    assert!(busts["N7DR"].contains("N7RD"));
    assert!(busts["N7RD"].contains("N7DR"));
    assert!(!busts.contains_key("K1ABC"));
}

#[test]
fn normalize_uppercases_and_strips_qrp_markers() {
    assert_eq!(normalize("w1aw/qrp"), "W1AW");
    assert_eq!(normalize("k2x/QRPP"), "K2X");
    assert_eq!(normalize("ea8/k1abc"), "EA8/K1ABC");
}

#[test]
fn plausibility_requires_length_letter_and_digit() {
    assert!(is_plausible("W1AW"));
    assert!(is_plausible("A5A"));
    assert!(!is_plausible("ABC")); // no digit
    assert!(!is_plausible("123")); // no letter
    assert!(!is_plausible("A1")); // too short
    assert!(!is_plausible("W1A W")); // illegal character
}

#[test]
fn output_order_groups_calls_by_numeric_area() {
    let mut calls = vec!["N7DR", "K9XYZ", "W1ABC", "K1ABC"];
    calls.sort_by(|a, b| scp_order(a, b));

    assert_eq!(calls, vec!["K1ABC", "W1ABC", "N7DR", "K9XYZ"]);
}

fn call_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z0-9]{2,7}").expect("valid regex")
}

proptest! {
    #[test]
    fn bust_relation_is_symmetric(a in call_strategy(), b in call_strategy()) {
        prop_assert_eq!(is_bust(&a, &b), is_bust(&b, &a));
    }

    #[test]
    fn bust_relation_is_irreflexive(a in call_strategy()) {
        prop_assert!(!is_bust(&a, &a));
    }

    #[test]
    fn possible_busts_agrees_with_pairwise_tests(
        calls in prop::collection::hash_set(call_strategy(), 1..12)
    ) {
        let calls: HashSet<String> = calls.into_iter().collect();
        let busts = possible_busts(&calls);

        for a in &calls {
            for b in &calls {
                let listed = busts.get(a).is_some_and(|set| set.contains(b));
                prop_assert_eq!(listed, is_bust(a, b));
            }
        }
    }

    #[test]
    fn scp_order_is_a_total_order(a in call_strategy(), b in call_strategy()) {
        match scp_order(&a, &b) {
            Ordering::Equal => prop_assert_eq!(&a, &b),
            Ordering::Less => prop_assert_eq!(scp_order(&b, &a), Ordering::Greater),
            Ordering::Greater => prop_assert_eq!(scp_order(&b, &a), Ordering::Less),
        }
    }
}
