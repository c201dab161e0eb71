use std::sync::Arc;
use std::thread::JoinHandle;

use crate::dict::{DictType, TrieStore};

use super::{spawn_writer, PendingWrites, WordChange, WordRowLoader, WordStore};

/// Words the user owns: promoted auto-learned words and explicit additions.
/// Rows live in a [`WordStore`] so they survive a restart.
pub struct UserDictionary {
    dict: TrieStore,
    locale: String,
    store: Arc<dyn WordStore>,
    pending: Arc<PendingWrites<String, Option<i32>>>,
}

impl UserDictionary {
    pub fn new(locale: impl Into<String>, store: Arc<dyn WordStore>) -> Self {
        let locale = locale.into();
        let pending = Arc::new(PendingWrites::new());
        let dict = TrieStore::with_loader(
            DictType::User,
            WordRowLoader {
                store: Arc::clone(&store),
                locale: locale.clone(),
                pending: Arc::clone(&pending),
            },
        );
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

    /// Store `word` at `frequency`, or keep the stored frequency if higher.
    pub fn add_word(&self, word: &str, frequency: i32) {
        self.dict.ensure_loaded();
        self.dict.add_word(word, frequency);
        if let Some(stored) = self.dict.word_frequency(word) {
            self.pending.insert(word.to_string(), Some(i32::from(stored)));
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Write pending words on a background thread. Returns `None` when
    /// nothing was pending.
    pub fn flush_pending_writes(&self) -> Option<JoinHandle<()>> {
        let pending = self.pending.take();
        if pending.is_empty() {
            return None;
        }
        let changes: Vec<WordChange> = pending
            .into_iter()
            .filter_map(|(word, frequency)| {
                frequency.map(|frequency| WordChange::Upsert { word, frequency })
            })
            .collect();
        let store = Arc::clone(&self.store);
        let locale = self.locale.clone();
        let rows = changes.len();
        spawn_writer("user-dict-writer", rows, move || {
            store.apply_words(&locale, &changes)
        })
    }
}
