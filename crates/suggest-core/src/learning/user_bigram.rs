use std::sync::Arc;
use std::thread::JoinHandle;

use crate::dict::{DictType, DictionaryLoader, LoadError, Trie, TrieStore};
use crate::settings::settings;

use super::{lowercase_first, spawn_writer, BigramRow, BigramStore, PendingWrites};

/// Upper bound of a learned pair's frequency.
fn maximum_frequency() -> i32 {
    i32::try_from(settings().scoring.maximum_bigram_frequency).unwrap_or(i32::MAX)
}

/// Stored pairs, capped at the maximum, then the pairs not yet written.
struct BigramRowLoader {
    store: Arc<dyn BigramStore>,
    locale: String,
    pending: Arc<PendingWrites<(String, String), i32>>,
}

impl DictionaryLoader for BigramRowLoader {
    fn load_into(&self, trie: &mut Trie) -> Result<(), LoadError> {
        let max = maximum_frequency();
        for row in self.store.load_bigrams(&self.locale)? {
            trie.set_bigram(&row.word1, &row.word2, row.frequency.min(max));
        }
        for ((word1, word2), frequency) in self.pending.snapshot() {
            trie.set_bigram(&word1, &word2, frequency);
        }
        Ok(())
    }
}

/// Word pairs the user actually typed, one after the other.
pub struct UserBigramDictionary {
    dict: TrieStore,
    locale: String,
    store: Arc<dyn BigramStore>,
    pending: Arc<PendingWrites<(String, String), i32>>,
}

impl UserBigramDictionary {
    /// Added to a pair each time it is typed.
    pub const FREQUENCY_FOR_TYPED: i32 = 2;

    pub fn new(locale: impl Into<String>, store: Arc<dyn BigramStore>) -> Self {
        let locale = locale.into();
        let pending = Arc::new(PendingWrites::new());
        let dict = TrieStore::with_loader(
            DictType::User,
            BigramRowLoader {
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

    /// Record that `word2` followed `word1`. Returns the pair's new
    /// frequency, capped at the bigram maximum, or `None` if either word
    /// cannot be stored.
    pub fn add_bigram(&self, word1: &str, word2: &str, auto_capitalized: bool) -> Option<i32> {
        let word2 = if auto_capitalized {
            lowercase_first(word2)
        } else {
            word2.to_string()
        };
        self.dict.ensure_loaded();
        let max = maximum_frequency();
        let mut frequency = self
            .dict
            .add_bigram(word1, &word2, Self::FREQUENCY_FOR_TYPED)?;
        if frequency > max {
            frequency = self.dict.set_bigram(word1, &word2, max)?;
        }
        self.pending
            .insert((word1.to_string(), word2), frequency);
        Some(frequency)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Write pending pairs on a background thread. Returns `None` when
    /// nothing was pending.
    pub fn flush_pending_writes(&self) -> Option<JoinHandle<()>> {
        let pending = self.pending.take();
        if pending.is_empty() {
            return None;
        }
        let rows: Vec<BigramRow> = pending
            .into_iter()
            .map(|((word1, word2), frequency)| BigramRow {
                word1,
                word2,
                frequency,
                locale: self.locale.clone(),
            })
            .collect();
        let store = Arc::clone(&self.store);
        let count = rows.len();
        spawn_writer("user-bigram-writer", count, move || {
            store.upsert_bigrams(&rows)
        })
    }
}
