//! Proximity-aware recursive walk producing completions and corrections.

use tracing::debug;

use crate::composer::Composer;
use crate::settings::ScoringSettings;
use crate::unicode::{fold_char, APOSTROPHE};

use super::trie::{NodeId, Trie};
use super::{DataType, DictType, WordCallback};

/// Characters with a code point below this get a histogram slot.
pub const NEXT_LETTERS_SIZE: usize = 1280;

/// How often each character follows the typed prefix among completions.
/// The keyboard uses it to enlarge likely next keys.
#[derive(Debug, Clone)]
pub struct NextLetterFrequencies {
    counts: Vec<u32>,
}

impl Default for NextLetterFrequencies {
    fn default() -> Self {
        Self {
            counts: vec![0; NEXT_LETTERS_SIZE],
        }
    }
}

impl NextLetterFrequencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, c: char) -> u32 {
        self.counts.get(c as usize).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.counts.fill(0);
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }

    fn bump(&mut self, c: char) {
        if let Some(slot) = self.counts.get_mut(c as usize) {
            *slot += 1;
        }
    }
}

/// One fuzzy query over a trie. Holds the per-query constants so the
/// recursion only threads the varying state.
pub(crate) struct FuzzyWalk<'a, C: WordCallback> {
    trie: &'a Trie,
    codes: &'a [Vec<char>],
    typed: Vec<char>,
    max_depth: usize,
    dict: DictType,
    include_typed_word: bool,
    primary_attenuation: i64,
    alternate_attenuation: i64,
    full_word_multiplier: i64,
    callback: &'a mut C,
    next_letters: Option<&'a mut NextLetterFrequencies>,
    word: Vec<char>,
}

impl<'a, C: WordCallback> FuzzyWalk<'a, C> {
    pub(crate) fn new(
        trie: &'a Trie,
        composer: &'a Composer,
        dict: DictType,
        scoring: &ScoringSettings,
        include_typed_word: bool,
        callback: &'a mut C,
        next_letters: Option<&'a mut NextLetterFrequencies>,
    ) -> Self {
        let codes = composer.all_codes();
        Self {
            trie,
            codes,
            typed: composer
                .typed_word()
                .map(|w| w.chars().collect())
                .unwrap_or_default(),
            max_depth: codes.len() * scoring.depth_factor,
            dict,
            include_typed_word,
            primary_attenuation: scoring.primary_attenuation,
            alternate_attenuation: scoring.alternate_attenuation,
            full_word_multiplier: scoring.full_word_multiplier,
            callback,
            next_letters,
            word: Vec::new(),
        }
    }

    /// One pass without a skip position, then one pass per keystroke with
    /// that position skippable.
    pub(crate) fn run(mut self) {
        if self.codes.is_empty() {
            return;
        }
        let trie = self.trie;
        let roots = trie.roots();
        if !self.walk(roots, 0, false, 1, 0, None) {
            return;
        }
        for skip in 0..self.codes.len() {
            self.word.clear();
            if !self.walk(roots, 0, false, 1, 0, Some(skip)) {
                return;
            }
        }
        debug!(dict = ?self.dict, keystrokes = self.codes.len(), "fuzzy walk done");
    }

    /// Returns `false` once the callback asked to stop.
    fn walk(
        &mut self,
        nodes: &'a [NodeId],
        depth: usize,
        completion: bool,
        snr: i64,
        input_index: usize,
        skip_pos: Option<usize>,
    ) -> bool {
        if depth > self.max_depth {
            return true;
        }
        let input_len = self.codes.len();
        let completion = completion || input_index >= input_len;
        let trie = self.trie;

        for &id in nodes {
            let node = trie.node(id);
            let c = node.ch;
            let frequency = i64::from(node.frequency);
            self.word.truncate(depth);
            self.word.push(c);

            if completion {
                if node.terminal {
                    let score = frequency.saturating_mul(snr);
                    if !self
                        .callback
                        .add_word(&self.word, score, self.dict, DataType::Unigram)
                    {
                        return false;
                    }
                    if skip_pos.is_none() && depth >= input_index {
                        if let Some(next) = self.next_letters.as_deref_mut() {
                            next.bump(self.word[input_index]);
                        }
                    }
                }
                if !node.children.is_empty()
                    && !self.walk(&node.children, depth + 1, true, snr, input_index, skip_pos)
                {
                    return false;
                }
                continue;
            }

            let codes = self.codes;
            let current: &'a [char] = &codes[input_index];
            let primary = current.first().copied();
            if (c == APOSTROPHE && primary != Some(APOSTROPHE)) || skip_pos == Some(depth) {
                // Consume the trie character without a keystroke.
                if !node.children.is_empty()
                    && !self.walk(&node.children, depth + 1, false, snr, input_index, skip_pos)
                {
                    return false;
                }
                continue;
            }

            let lower = fold_char(c);
            // A skip pass only follows the key that was actually hit.
            let alternatives = if skip_pos.is_some() { 1 } else { current.len() };
            for (j, &code) in current.iter().take(alternatives).enumerate() {
                if code != lower && code != c {
                    continue;
                }
                let attenuation = if j > 0 {
                    self.alternate_attenuation
                } else {
                    self.primary_attenuation
                };
                self.word.truncate(depth + 1);

                if input_index + 1 == input_len {
                    if node.terminal && (self.include_typed_word || self.word != self.typed) {
                        let mut score = frequency.saturating_mul(snr).saturating_mul(attenuation);
                        if skip_pos.is_none() {
                            score = score.saturating_mul(self.full_word_multiplier);
                        }
                        if !self
                            .callback
                            .add_word(&self.word, score, self.dict, DataType::Unigram)
                        {
                            return false;
                        }
                    }
                    if !node.children.is_empty()
                        && !self.walk(
                            &node.children,
                            depth + 1,
                            true,
                            snr.saturating_mul(attenuation),
                            input_index + 1,
                            skip_pos,
                        )
                    {
                        return false;
                    }
                } else if !node.children.is_empty()
                    && !self.walk(
                        &node.children,
                        depth + 1,
                        false,
                        snr.saturating_mul(attenuation),
                        input_index + 1,
                        skip_pos,
                    )
                {
                    return false;
                }
            }
        }
        true
    }
}
