//! Dictionaries that learn from what the user types.
//!
//! `AutoDictionary` counts typed and picked words and promotes frequent ones
//! to the [`UserDictionary`]; `UserBigramDictionary` accumulates word pairs.
//! All of them keep learned entries in a [`PendingWrites`] buffer that is
//! flushed to a row store on a writer thread. Until then a reload replays
//! the buffer on top of the stored rows.

mod auto_dict;
mod store;
mod user_bigram;
mod user_dict;

pub use auto_dict::{AddOutcome, AutoDictionary};
pub use store::{
    BigramRow, BigramStore, FileBigramStore, FileWordStore, MemoryBigramStore, MemoryWordStore,
    WordChange, WordRow, WordStore,
};
pub use user_bigram::UserBigramDictionary;
pub use user_dict::UserDictionary;

use std::collections::HashMap;
use std::hash::Hash;
use std::io;
use std::mem;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::dict::{DictionaryLoader, LoadError, Trie};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),
}

/// Learned entries not yet persisted. Later writes to a key replace
/// earlier ones.
#[derive(Debug)]
pub struct PendingWrites<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K: Eq + Hash, V> Default for PendingWrites<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V> PendingWrites<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: K, value: V) {
        self.lock().insert(key, value);
    }

    /// Swap in an empty buffer and return what was pending. Writes racing
    /// with a flush land in the fresh buffer.
    pub fn take(&self) -> HashMap<K, V> {
        mem::take(&mut *self.lock())
    }

    /// Copy of what is pending, for replaying on top of stored rows.
    pub fn snapshot(&self) -> HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fills a word dictionary from its row store, then replays the entries
/// still waiting to be written. A pending `None` hides the stored row.
struct WordRowLoader {
    store: Arc<dyn WordStore>,
    locale: String,
    pending: Arc<PendingWrites<String, Option<i32>>>,
}

impl DictionaryLoader for WordRowLoader {
    fn load_into(&self, trie: &mut Trie) -> Result<(), LoadError> {
        let pending = self.pending.snapshot();
        for row in self.store.load_words(&self.locale)? {
            if !pending.contains_key(&row.word) {
                trie.add_word(&row.word, row.frequency);
            }
        }
        for (word, frequency) in pending {
            if let Some(frequency) = frequency {
                trie.add_word(&word, frequency);
            }
        }
        Ok(())
    }
}

/// Run `job` on a named writer thread. Failures are logged, not returned.
fn spawn_writer<F>(name: &str, rows: usize, job: F) -> Option<JoinHandle<()>>
where
    F: FnOnce() -> Result<(), StoreError> + Send + 'static,
{
    let label = name.to_string();
    let spawned = thread::Builder::new()
        .name(format!("keysuggest-{name}"))
        .spawn(move || match job() {
            Ok(()) => debug!(writer = %label, rows, "pending writes flushed"),
            Err(e) => warn!(writer = %label, "failed to flush pending writes: {e}"),
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("failed to spawn {name} writer: {e}");
            None
        }
    }
}

/// Undo the sentence-start capital the keyboard added on its own.
fn lowercase_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
