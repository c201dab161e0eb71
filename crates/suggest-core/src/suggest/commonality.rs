//! Sanity check between the typed word and the best correction.

use crate::unicode::fold_char;

/// Position-wise folded matches between `original` and `suggestion` over
/// their common length, also counting a match one position further into
/// the suggestion (a single inserted character). Returns the better count.
pub fn matching_chars(original: &str, suggestion: &str) -> usize {
    let original: Vec<char> = original.chars().map(fold_char).collect();
    let suggestion: Vec<char> = suggestion.chars().map(fold_char).collect();
    let min_len = original.len().min(suggestion.len());

    let mut matching = 0;
    let mut less_matching = 0;
    for (i, &c) in original.iter().take(min_len).enumerate() {
        if c == suggestion[i] {
            matching += 1;
            less_matching += 1;
        } else if suggestion.get(i + 1) == Some(&c) {
            less_matching += 1;
        }
    }
    matching.max(less_matching)
}

/// Whether `suggestion` shares enough characters with `original` to be
/// trusted as an automatic correction.
pub fn has_sufficient_commonality(original: &str, suggestion: &str) -> bool {
    let min_len = original.chars().count().min(suggestion.chars().count());
    if min_len <= 2 {
        return true;
    }
    let matching = matching_chars(original, suggestion);
    if min_len <= 4 {
        matching >= 2
    } else {
        matching > min_len / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_chars() {
        assert_eq!(matching_chars("hello", "hello"), 5);
        assert_eq!(matching_chars("hello", "hallo"), 4);
        assert_eq!(matching_chars("abc", "xyz"), 0);
        assert_eq!(matching_chars("hel", "hello"), 3);
        assert_eq!(matching_chars("HELLO", "hello"), 5);
        assert_eq!(matching_chars("cafe", "café"), 4);
    }

    #[test]
    fn test_insertion_offset() {
        // "thre" against "there": t,h match, then r/e line up one further in.
        assert_eq!(matching_chars("thre", "there"), 4);
    }

    #[test]
    fn test_short_words_always_pass() {
        assert!(has_sufficient_commonality("ab", "xy"));
        assert!(has_sufficient_commonality("a", "zebra"));
    }

    #[test]
    fn test_medium_words_need_two() {
        assert!(has_sufficient_commonality("abc", "abd"));
        assert!(!has_sufficient_commonality("abc", "xbz"));
        assert!(!has_sufficient_commonality("qwer", "asdf"));
    }

    #[test]
    fn test_long_words_need_half() {
        assert!(has_sufficient_commonality("abcde", "abcxy"));
        assert!(!has_sufficient_commonality("abcde", "abxyz"));
    }
}
