//! Candidate collection across dictionaries.
//!
//! `Suggest` queries the user, contacts and main dictionaries for the word
//! being composed (or the bigram dictionaries for the first letter of a new
//! word), merges everything into one bounded ranked list, restores the
//! typed capitalization and decides whether the top candidate is safe to
//! auto-correct to.

mod autotext;
mod commonality;
mod ranked;
#[cfg(test)]
mod tests;

pub use autotext::{AutoText, AutoTextTable};
pub use commonality::{has_sufficient_commonality, matching_chars};
pub use ranked::{Ranked, RankedList};

use std::iter;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, debug_span};

use crate::composer::Composer;
use crate::dict::{DataType, DictType, NextLetterFrequencies, TrieStore, WordCallback};
use crate::settings::{settings, ScoringSettings, MAX_SUGGESTIONS_LIMIT};
use crate::unicode::{lower_char, upper_char};

/// Longest word the collector expects to handle.
pub const APPROX_MAX_WORD_LENGTH: usize = 32;

/// Main dictionaries larger than this (in bytes) count as real ones.
pub const LARGE_DICTIONARY_THRESHOLD: usize = 200_000;

/// How aggressively suggestions may replace what was typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionMode {
    None = 0,
    Basic = 1,
    Full = 2,
    FullBigram = 3,
}

impl CorrectionMode {
    /// Whether the first keystroke of a word is answered from bigrams.
    pub fn uses_bigrams(self) -> bool {
        matches!(self, Self::Basic | Self::FullBigram)
    }

    /// Whether corrections may be applied automatically.
    pub fn is_full(self) -> bool {
        matches!(self, Self::Full | Self::FullBigram)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("max suggestions must be in 1..={limit}, got {0}", limit = MAX_SUGGESTIONS_LIMIT)]
    InvalidMaxSuggestions(usize),
}

/// Per-query working state; receives every candidate the dictionaries emit.
struct Collector {
    suggestions: RankedList,
    /// Kept across keystrokes of one word so unigrams can be boosted by it.
    bigrams: RankedList,
    typed_lower: Vec<char>,
    all_upper: bool,
    first_capitalized: bool,
    multiplier_min: f64,
    multiplier_max: f64,
    max_bigram_frequency: i64,
}

impl Collector {
    fn new(max_suggestions: usize, max_bigrams: usize, scoring: &ScoringSettings) -> Self {
        Self {
            suggestions: RankedList::new(max_suggestions),
            bigrams: RankedList::new(max_bigrams),
            typed_lower: Vec::new(),
            all_upper: false,
            first_capitalized: false,
            multiplier_min: scoring.bigram_multiplier_min,
            multiplier_max: scoring.bigram_multiplier_max,
            max_bigram_frequency: scoring.maximum_bigram_frequency,
        }
    }

    fn begin(&mut self, composer: &Composer) {
        self.suggestions.clear();
        self.typed_lower = composer
            .typed_word()
            .map(|w| w.chars().map(lower_char).collect())
            .unwrap_or_default();
        self.all_upper = composer.is_all_upper_case();
        self.first_capitalized = composer.is_first_char_capitalized();
    }

    /// Same length as the typed word, starts uppercase and is otherwise the
    /// typed word: the user's word in its proper case.
    fn is_typed_word_recased(&self, word: &[char]) -> bool {
        word.len() == self.typed_lower.len()
            && word.first().is_some_and(|c| c.is_uppercase())
            && word
                .iter()
                .zip(&self.typed_lower)
                .all(|(&c, &typed)| lower_char(c) == typed)
    }

    fn bigram_boost(&self, frequency: i64, bigram_frequency: i64) -> i64 {
        let ratio = bigram_frequency as f64 / self.max_bigram_frequency as f64;
        let multiplier =
            ratio * (self.multiplier_max - self.multiplier_min) + self.multiplier_min;
        (frequency as f64 * multiplier).round() as i64
    }

    fn restore_case(&self, word: &[char]) -> String {
        if self.all_upper {
            word.iter().collect::<String>().to_uppercase()
        } else if self.first_capitalized {
            let mut out = String::with_capacity(word.len());
            if let Some((&first, rest)) = word.split_first() {
                out.push(upper_char(first));
                out.extend(rest);
            }
            out
        } else {
            word.iter().collect()
        }
    }
}

impl WordCallback for Collector {
    fn add_word(&mut self, word: &[char], frequency: i64, _dict: DictType, data: DataType) -> bool {
        let forced = self.is_typed_word_recased(word);
        let mut priority = frequency;
        if !forced && data == DataType::Unigram {
            let raw: String = word.iter().collect();
            if let Some(bigram) = self.bigrams.priority_of(&raw) {
                priority = self.bigram_boost(frequency, bigram);
            }
        }
        let surface = self.restore_case(word);
        let list = match data {
            DataType::Unigram => &mut self.suggestions,
            DataType::Bigram => &mut self.bigrams,
        };
        if forced {
            list.insert_first(surface, priority);
        } else {
            list.insert(surface, priority);
        }
        true
    }
}

/// Suggestion collector for one input session.
pub struct Suggest {
    main: TrieStore,
    user: Option<TrieStore>,
    contacts: Option<TrieStore>,
    auto: Option<TrieStore>,
    user_bigram: Option<TrieStore>,
    auto_text: Option<Arc<dyn AutoText>>,
    correction_mode: CorrectionMode,
    max_suggestions: usize,
    autotext_max: usize,
    collector: Collector,
    next_letters: NextLetterFrequencies,
    have_correction: bool,
}

impl Suggest {
    pub fn new(main: TrieStore) -> Self {
        let s = settings();
        Self {
            main,
            user: None,
            contacts: None,
            auto: None,
            user_bigram: None,
            auto_text: None,
            correction_mode: s.suggest.correction_mode,
            max_suggestions: s.suggest.max_suggestions,
            autotext_max: s.suggest.autotext_max,
            collector: Collector::new(
                s.suggest.max_suggestions,
                s.suggest.max_bigram_suggestions,
                &s.scoring,
            ),
            next_letters: NextLetterFrequencies::new(),
            have_correction: false,
        }
    }

    pub fn main_dictionary(&self) -> &TrieStore {
        &self.main
    }

    pub fn set_user_dictionary(&mut self, dict: Option<TrieStore>) {
        self.user = dict;
    }

    pub fn set_contacts_dictionary(&mut self, dict: Option<TrieStore>) {
        self.contacts = dict;
    }

    pub fn set_auto_dictionary(&mut self, dict: Option<TrieStore>) {
        self.auto = dict;
    }

    pub fn set_user_bigram_dictionary(&mut self, dict: Option<TrieStore>) {
        self.user_bigram = dict;
    }

    pub fn set_auto_text(&mut self, auto_text: Option<Arc<dyn AutoText>>) {
        self.auto_text = auto_text;
    }

    pub fn correction_mode(&self) -> CorrectionMode {
        self.correction_mode
    }

    pub fn set_correction_mode(&mut self, mode: CorrectionMode) {
        self.correction_mode = mode;
    }

    pub fn max_suggestions(&self) -> usize {
        self.max_suggestions
    }

    pub fn set_max_suggestions(&mut self, max: usize) -> Result<(), SuggestError> {
        if !(1..=MAX_SUGGESTIONS_LIMIT).contains(&max) {
            return Err(SuggestError::InvalidMaxSuggestions(max));
        }
        self.max_suggestions = max;
        self.collector.suggestions.set_capacity(max);
        Ok(())
    }

    pub fn approx_max_word_length(&self) -> usize {
        APPROX_MAX_WORD_LENGTH
    }

    /// Whether a full-size main dictionary is loaded.
    pub fn has_main_dictionary(&self) -> bool {
        self.main.size() > LARGE_DICTIONARY_THRESHOLD
    }

    /// Whether the last query produced a suggestion worth auto-correcting to.
    pub fn has_minimal_correction(&self) -> bool {
        self.have_correction
    }

    /// Next-letter histogram of the last query.
    pub fn next_letter_frequencies(&self) -> &NextLetterFrequencies {
        &self.next_letters
    }

    /// Known to any dictionary; auto-learned words must reach the auto
    /// dictionary's validity threshold.
    pub fn is_valid_word(&self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        self.main.is_valid_word(word)
            || self.user.as_ref().is_some_and(|d| d.is_valid_word(word))
            || self.auto.as_ref().is_some_and(|d| d.is_valid_word(word))
            || self.contacts.as_ref().is_some_and(|d| d.is_valid_word(word))
    }

    /// Ranked suggestions for the composed word. Index 0 is always the typed
    /// word itself; the list never exceeds the configured maximum.
    pub fn get_suggestions(
        &mut self,
        composer: &Composer,
        include_typed_word_if_valid: bool,
        previous_word: Option<&str>,
    ) -> Vec<String> {
        let _span = debug_span!("get_suggestions", keystrokes = composer.size()).entered();
        self.have_correction = false;
        self.next_letters.clear();
        self.collector.begin(composer);

        let typed = composer.typed_word().unwrap_or_default();
        let full = self.correction_mode.is_full();

        if composer.size() == 1 && self.correction_mode.uses_bigrams() {
            self.collector.bigrams.clear();
            if let Some(previous) = previous_word.filter(|w| !w.is_empty()) {
                self.collect_bigrams(previous);
                self.seed_from_bigrams(typed);
            }
        } else if composer.size() > 1 {
            let has_supplementary = self.user.is_some() || self.contacts.is_some();
            for dict in [&self.user, &self.contacts].into_iter().flatten() {
                dict.search(
                    composer,
                    &mut self.collector,
                    Some(&mut self.next_letters),
                    include_typed_word_if_valid,
                );
            }
            if has_supplementary
                && full
                && !self.collector.suggestions.is_empty()
                && self.is_valid_word(typed)
            {
                self.have_correction = true;
            }
            self.main.search(
                composer,
                &mut self.collector,
                Some(&mut self.next_letters),
                include_typed_word_if_valid,
            );
            if full && !self.collector.suggestions.is_empty() {
                self.have_correction = true;
            }
        }

        let mut words = self.collector.suggestions.take_words();
        if !typed.is_empty() {
            words.insert(0, typed.to_string());
        }

        if composer.size() > 1
            && words.len() > 1
            && full
            && !has_sufficient_commonality(&typed.to_lowercase(), &words[1])
        {
            self.have_correction = false;
        }

        self.apply_auto_text(&mut words);
        remove_dupes(&mut words);
        words.truncate(self.max_suggestions);
        debug!(
            count = words.len(),
            has_correction = self.have_correction,
            "suggestions ready"
        );
        words
    }

    fn collect_bigrams(&mut self, previous: &str) {
        let lower = previous.to_lowercase();
        let previous = if self.main.is_valid_word(&lower) {
            lower.as_str()
        } else {
            previous
        };
        let sources = [&self.user_bigram, &self.contacts]
            .into_iter()
            .flatten()
            .chain(iter::once(&self.main));
        for dict in sources {
            dict.get_bigrams(previous, &mut self.collector);
        }
        debug!(bigrams = self.collector.bigrams.len(), "bigram candidates");
    }

    /// Copy bigram candidates starting with the typed letter, in either case.
    fn seed_from_bigrams(&mut self, typed: &str) {
        let Some(first) = typed.chars().next().map(lower_char) else {
            return;
        };
        let Collector {
            suggestions,
            bigrams,
            ..
        } = &mut self.collector;
        for word in bigrams.words() {
            if word.chars().next().map(lower_char) != Some(first) {
                continue;
            }
            if !suggestions.push_unranked(word.to_string()) {
                break;
            }
        }
    }

    /// Splice shorthand expansions right after their source word.
    fn apply_auto_text(&mut self, words: &mut Vec<String>) {
        let Some(auto_text) = &self.auto_text else {
            return;
        };
        let basic = self.correction_mode == CorrectionMode::Basic;
        let max = if basic { 1 } else { self.autotext_max };
        let mut i = 0;
        while i < words.len() && i < max {
            if let Some(expansion) = auto_text.lookup(&words[i].to_lowercase()) {
                let already_listed = expansion == words[i]
                    || (!basic && words.get(i + 1).is_some_and(|next| *next == expansion));
                if !already_listed {
                    self.have_correction = true;
                    words.insert(i + 1, expansion);
                    i += 1;
                }
            }
            i += 1;
        }
    }
}

/// Drop later exact duplicates, keeping first occurrences in order.
fn remove_dupes(words: &mut Vec<String>) {
    let mut i = 1;
    while i < words.len() {
        if words[..i].contains(&words[i]) {
            words.remove(i);
        } else {
            i += 1;
        }
    }
}
