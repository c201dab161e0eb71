//! Property-based tests for the ranked list and the collector bound.

use proptest::prelude::*;

use super::{suggest_with, typed};
use crate::suggest::RankedList;

fn arb_candidate() -> impl Strategy<Value = (String, i64)> {
    ("[a-e]{1,6}", -20i64..200)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn ranked_list_stays_sorted_and_bounded(
        capacity in 0usize..16,
        candidates in prop::collection::vec(arb_candidate(), 0..64),
    ) {
        let mut list = RankedList::new(capacity);
        for (word, priority) in candidates {
            list.insert(word, priority);
        }
        prop_assert!(list.len() <= capacity);
        let entries: Vec<_> = list.iter().collect();
        for pair in entries.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(a.priority >= b.priority);
            if a.priority == b.priority {
                prop_assert!(a.word.chars().count() <= b.word.chars().count());
            }
        }
        prop_assert!(entries.iter().all(|e| e.priority > 0));
    }

    #[test]
    fn suggestions_never_exceed_max(
        max in 1usize..8,
        input in "[a-c]{0,5}",
    ) {
        let mut suggest = suggest_with(&[
            ("a", 10), ("ab", 20), ("abc", 30), ("abca", 40), ("b", 50),
            ("ba", 60), ("bac", 70), ("cab", 80), ("cabbage", 90), ("acab", 100),
        ]);
        suggest.set_max_suggestions(max).unwrap();
        let words = suggest.get_suggestions(&typed(&input), false, Some("a"));
        prop_assert!(words.len() <= max);
        if !input.is_empty() {
            prop_assert_eq!(&words[0], &input);
        }
    }
}
