//! The word currently being typed.
//!
//! Each keystroke contributes the literal character plus a ranked list of
//! nearby key codes (index 0 = the key the user actually hit).

use crate::unicode::lower_char;

/// Sentinel terminating a raw key-code array.
pub const NOT_A_CODE: i32 = -1;

/// Convert a raw key-code array into candidate characters, stopping at the
/// first negative sentinel or invalid scalar value.
pub fn codes_from_raw(raw: &[i32]) -> Vec<char> {
    raw.iter()
        .map_while(|&code| u32::try_from(code).ok().and_then(char::from_u32))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    codes: Vec<Vec<char>>,
    typed_word: String,
    preferred_word: Option<String>,
    caps_count: usize,
    first_char_capitalized: bool,
    auto_capitalized: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a composer from a literal string, one keystroke per character
    /// with no proximity alternatives.
    pub fn from_typed(word: &str) -> Self {
        let mut composer = Self::new();
        for c in word.chars() {
            composer.add(c, &[c]);
        }
        composer
    }

    /// Number of keystrokes.
    pub fn size(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Candidate characters of keystroke `index`, lowercased, primary first.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    pub fn codes_at(&self, index: usize) -> &[char] {
        &self.codes[index]
    }

    pub(crate) fn all_codes(&self) -> &[Vec<char>] {
        &self.codes
    }

    /// Append a keystroke.
    pub fn add(&mut self, primary: char, codes: &[char]) {
        if self.codes.is_empty() {
            self.first_char_capitalized = primary.is_uppercase();
        }
        self.typed_word.push(primary);

        let mut codes = codes.to_vec();
        if codes.is_empty() {
            codes.push(primary);
        }
        correct_primary_juxtaposition(primary, &mut codes);
        for code in codes.iter_mut() {
            *code = lower_char(*code);
        }
        self.codes.push(codes);

        if primary.is_uppercase() {
            self.caps_count += 1;
        }
    }

    /// Remove the last keystroke. No-op when empty.
    pub fn delete_last(&mut self) {
        if self.codes.pop().is_none() {
            return;
        }
        if let Some(last) = self.typed_word.pop() {
            if last.is_uppercase() {
                self.caps_count = self.caps_count.saturating_sub(1);
            }
        }
        if self.codes.is_empty() {
            self.first_char_capitalized = false;
        }
    }

    /// Clear everything at a word boundary.
    pub fn reset(&mut self) {
        self.codes.clear();
        self.typed_word.clear();
        self.preferred_word = None;
        self.caps_count = 0;
        self.first_char_capitalized = false;
    }

    /// The literal typed string, `None` when nothing has been typed.
    pub fn typed_word(&self) -> Option<&str> {
        if self.codes.is_empty() {
            None
        } else {
            Some(&self.typed_word)
        }
    }

    pub fn set_preferred_word(&mut self, word: impl Into<String>) {
        self.preferred_word = Some(word.into());
    }

    /// The picked suggestion if one was set, else the typed word.
    pub fn preferred_word(&self) -> Option<&str> {
        self.preferred_word.as_deref().or_else(|| self.typed_word())
    }

    pub fn set_first_char_capitalized(&mut self, capitalized: bool) {
        self.first_char_capitalized = capitalized;
    }

    pub fn is_first_char_capitalized(&self) -> bool {
        self.first_char_capitalized
    }

    pub fn is_all_upper_case(&self) -> bool {
        self.caps_count > 0 && self.caps_count == self.size()
    }

    pub fn is_mostly_caps(&self) -> bool {
        self.caps_count > 1
    }

    /// Whether the first character was capitalized by the keyboard rather
    /// than the user (start of sentence).
    pub fn set_auto_capitalized(&mut self, auto: bool) {
        self.auto_capitalized = auto;
    }

    pub fn is_auto_capitalized(&self) -> bool {
        self.auto_capitalized
    }
}

/// Proximity ranking may put a neighbour ahead of the key that was actually
/// hit; swap them so index 0 is always the user's key.
fn correct_primary_juxtaposition(primary: char, codes: &mut [char]) {
    if codes.len() < 2 {
        return;
    }
    if codes[0] != primary && codes[1] == primary {
        codes.swap(0, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_word(c: &mut Composer, word: &str) {
        for ch in word.chars() {
            c.add(ch, &[ch]);
        }
    }

    #[test]
    fn test_initial_state() {
        let c = Composer::new();
        assert_eq!(c.size(), 0);
        assert_eq!(c.typed_word(), None);
        assert!(!c.is_first_char_capitalized());
        assert!(!c.is_all_upper_case());
        assert!(!c.is_auto_capitalized());
        assert_eq!(c.preferred_word(), None);
    }

    #[test]
    fn test_clone_keeps_state() {
        let mut c = Composer::new();
        type_word(&mut c, "Hi");
        c.set_preferred_word("Hello");
        let copy = c.clone();
        assert_eq!(copy.size(), 2);
        assert_eq!(copy.typed_word(), Some("Hi"));
        assert_eq!(copy.preferred_word(), Some("Hello"));
    }

    #[test]
    fn test_add_single_uppercase() {
        let mut c = Composer::new();
        c.add('A', &['A']);
        assert_eq!(c.typed_word(), Some("A"));
        assert!(c.is_all_upper_case());
        assert!(c.is_first_char_capitalized());
    }

    #[test]
    fn test_add_mixed_case() {
        let mut c = Composer::new();
        type_word(&mut c, "HeLlO");
        assert_eq!(c.size(), 5);
        assert_eq!(c.typed_word(), Some("HeLlO"));
        assert!(!c.is_all_upper_case());
        assert!(c.is_mostly_caps());
    }

    #[test]
    fn test_codes_are_lowercased() {
        let mut c = Composer::new();
        c.add('A', &['A', 'S', 'Q']);
        assert_eq!(c.codes_at(0), &['a', 's', 'q']);
    }

    #[test]
    fn test_primary_juxtaposition_swapped() {
        let mut c = Composer::new();
        c.add('a', &['s', 'a', 'q']);
        assert_eq!(c.codes_at(0), &['a', 's', 'q']);
    }

    #[test]
    fn test_no_swap_when_primary_first() {
        let mut c = Composer::new();
        c.add('a', &['a', 's', 'q']);
        assert_eq!(c.codes_at(0), &['a', 's', 'q']);
    }

    #[test]
    fn test_empty_codes_use_primary() {
        let mut c = Composer::new();
        c.add('x', &[]);
        assert_eq!(c.codes_at(0), &['x']);
    }

    #[test]
    fn test_delete_last() {
        let mut c = Composer::new();
        type_word(&mut c, "hi");
        c.delete_last();
        assert_eq!(c.size(), 1);
        assert_eq!(c.typed_word(), Some("h"));
        c.delete_last();
        assert_eq!(c.typed_word(), None);
        c.delete_last();
        assert_eq!(c.size(), 0);
    }

    #[test]
    fn test_delete_updates_caps() {
        let mut c = Composer::new();
        type_word(&mut c, "HI");
        assert!(c.is_all_upper_case());
        c.delete_last();
        assert!(c.is_all_upper_case());
        c.delete_last();
        assert!(!c.is_all_upper_case());
        assert!(!c.is_first_char_capitalized());

        type_word(&mut c, "ABc");
        assert!(c.is_mostly_caps());
        c.delete_last();
        assert!(c.is_mostly_caps());
        c.delete_last();
        assert!(!c.is_mostly_caps());
    }

    #[test]
    fn test_reset_clears_all_state() {
        let mut c = Composer::new();
        type_word(&mut c, "Hello");
        c.set_preferred_word("Help");
        c.reset();
        assert_eq!(c.size(), 0);
        assert_eq!(c.typed_word(), None);
        assert_eq!(c.preferred_word(), None);
        assert!(!c.is_first_char_capitalized());
        assert!(!c.is_all_upper_case());
    }

    #[test]
    fn test_first_char_flag_setter() {
        let mut c = Composer::new();
        c.set_first_char_capitalized(true);
        assert!(c.is_first_char_capitalized());
        c.set_first_char_capitalized(false);
        assert!(!c.is_first_char_capitalized());
    }

    #[test]
    fn test_auto_capitalized_flag() {
        let mut c = Composer::new();
        c.set_auto_capitalized(true);
        assert!(c.is_auto_capitalized());
        c.set_auto_capitalized(false);
        assert!(!c.is_auto_capitalized());
    }

    #[test]
    fn test_preferred_word_falls_back_to_typed() {
        let mut c = Composer::new();
        type_word(&mut c, "helo");
        assert_eq!(c.preferred_word(), Some("helo"));
        c.set_preferred_word("hello");
        assert_eq!(c.preferred_word(), Some("hello"));
    }

    #[test]
    #[should_panic]
    fn test_codes_at_out_of_range() {
        let c = Composer::new();
        let _ = c.codes_at(0);
    }

    #[test]
    fn test_codes_from_raw_stops_at_sentinel() {
        let raw = ['a' as i32, 's' as i32, NOT_A_CODE, 'q' as i32];
        assert_eq!(codes_from_raw(&raw), vec!['a', 's']);
        assert!(codes_from_raw(&[NOT_A_CODE]).is_empty());
    }

    #[test]
    fn test_unicode_and_punctuation() {
        let mut c = Composer::new();
        type_word(&mut c, "éñ");
        assert_eq!(c.typed_word(), Some("éñ"));
        c.reset();
        type_word(&mut c, "'-");
        assert_eq!(c.size(), 2);
        assert_eq!(c.typed_word(), Some("'-"));
    }

    #[test]
    fn test_from_typed() {
        let c = Composer::from_typed("supercalifragilisticexpialidocious");
        assert_eq!(c.size(), 34);
        assert_eq!(c.typed_word(), Some("supercalifragilisticexpialidocious"));
    }
}
