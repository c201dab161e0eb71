use std::sync::Arc;
use std::thread::JoinHandle;

use crate::dict::{DictType, TrieStore, MAX_WORD_LENGTH};

use super::{lowercase_first, spawn_writer, PendingWrites, WordChange, WordRowLoader, WordStore};

/// Result of [`AutoDictionary::add_word`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Too short or too long to learn.
    Ignored,
    Learned { frequency: i32 },
    /// Used often enough to move to the user dictionary. The auto entry is
    /// scheduled for deletion.
    Promoted { word: String, frequency: i32 },
}

/// Words the user typed or picked that the main dictionary did not know.
pub struct AutoDictionary {
    dict: TrieStore,
    locale: String,
    store: Arc<dyn WordStore>,
    pending: Arc<PendingWrites<String, Option<i32>>>,
}

impl AutoDictionary {
    pub const FREQUENCY_FOR_PICKED: i32 = 3;
    pub const FREQUENCY_FOR_TYPED: i32 = 1;
    /// Frequency given to a promoted word in the user dictionary.
    pub const FREQUENCY_FOR_AUTO_ADD: i32 = 250;
    pub const VALIDITY_THRESHOLD: i32 = 2 * Self::FREQUENCY_FOR_PICKED;
    pub const PROMOTION_THRESHOLD: i32 = 4 * Self::FREQUENCY_FOR_PICKED;

    /// Learned rows of `locale` are loaded from `store` on first use.
    pub fn new(locale: impl Into<String>, store: Arc<dyn WordStore>) -> Self {
        let locale = locale.into();
        let pending = Arc::new(PendingWrites::new());
        let dict = TrieStore::with_loader(
            DictType::Auto,
            WordRowLoader {
                store: Arc::clone(&store),
                locale: locale.clone(),
                pending: Arc::clone(&pending),
            },
        );
        dict.set_validity_threshold(Self::VALIDITY_THRESHOLD);
        Self {
            dict,
            locale,
            store,
            pending,
        }
    }

    pub fn dictionary(&self) -> &TrieStore {
        &self.dict
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn is_valid_word(&self, word: &str) -> bool {
        self.dict.is_valid_word(word)
    }

    /// Count `delta` more uses of `word`. A sentence-start capital added by
    /// the keyboard is removed first.
    pub fn add_word(&self, word: &str, delta: i32, auto_capitalized: bool) -> AddOutcome {
        let len = word.chars().count();
        if len < 2 || len >= MAX_WORD_LENGTH {
            return AddOutcome::Ignored;
        }
        let word = if auto_capitalized {
            lowercase_first(word)
        } else {
            word.to_string()
        };
        // Count on top of the stored rows, not on an empty trie.
        self.dict.ensure_loaded();
        let frequency = match self.dict.word_frequency(&word) {
            Some(existing) => i32::from(existing).saturating_add(delta),
            None => delta,
        };
        self.dict.add_word(&word, frequency);

        if frequency >= Self::PROMOTION_THRESHOLD {
            self.pending.insert(word.clone(), None);
            return AddOutcome::Promoted {
                word,
                frequency: Self::FREQUENCY_FOR_AUTO_ADD,
            };
        }
        self.pending.insert(word, Some(frequency));
        AddOutcome::Learned { frequency }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Write pending entries on a background thread. Returns `None` when
    /// nothing was pending.
    pub fn flush_pending_writes(&self) -> Option<JoinHandle<()>> {
        let pending = self.pending.take();
        if pending.is_empty() {
            return None;
        }
        let changes: Vec<WordChange> = pending
            .into_iter()
            .map(|(word, frequency)| match frequency {
                Some(frequency) => WordChange::Upsert { word, frequency },
                None => WordChange::Delete { word },
            })
            .collect();
        let store = Arc::clone(&self.store);
        let locale = self.locale.clone();
        let rows = changes.len();
        spawn_writer("auto-dict-writer", rows, move || {
            store.apply_words(&locale, &changes)
        })
    }
}
