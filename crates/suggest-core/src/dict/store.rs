use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};
use std::thread;

use tracing::{debug, debug_span, warn};

use crate::composer::Composer;
use crate::settings::settings;

use super::fuzzy::{FuzzyWalk, NextLetterFrequencies};
use super::trie::Trie;
use super::{DataType, DictType, LoadError, WordCallback};

/// Fills a trie from some backing source (blob, row store, contacts...).
///
/// Runs on a background thread; the trie passed in is fresh and only
/// becomes visible to queries once loading succeeded.
pub trait DictionaryLoader: Send + Sync {
    fn load_into(&self, trie: &mut Trie) -> Result<(), LoadError>;
}

impl<F> DictionaryLoader for F
where
    F: Fn(&mut Trie) -> Result<(), LoadError> + Send + Sync,
{
    fn load_into(&self, trie: &mut Trie) -> Result<(), LoadError> {
        self(trie)
    }
}

/// Loads a compiled dictionary blob (see [`Trie::to_bytes`]).
pub struct BlobLoader {
    source: BlobSource,
}

enum BlobSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl BlobLoader {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: BlobSource::Path(path.into()),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            source: BlobSource::Bytes(bytes),
        }
    }
}

impl DictionaryLoader for BlobLoader {
    fn load_into(&self, trie: &mut Trie) -> Result<(), LoadError> {
        *trie = match &self.source {
            BlobSource::Path(path) => Trie::open(path)?,
            BlobSource::Bytes(bytes) => Trie::from_bytes(bytes)?,
        };
        Ok(())
    }
}

#[derive(Default)]
struct LoadState {
    requires_reload: bool,
    updating: bool,
}

struct Shared {
    dict_type: DictType,
    trie: RwLock<Trie>,
    state: Mutex<LoadState>,
    loaded: Condvar,
    loader: Option<Arc<dyn DictionaryLoader>>,
    validity_threshold: AtomicI32,
    include_typed_word: AtomicBool,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_load(&self, loader: &dyn DictionaryLoader) {
        let _guard = UpdatingGuard(self);
        let _span = debug_span!("dictionary_load", dict = ?self.dict_type).entered();
        let mut fresh = Trie::new();
        match loader.load_into(&mut fresh) {
            Ok(()) => {
                debug!(words = fresh.word_count(), nodes = fresh.node_count());
                *self.trie.write().unwrap_or_else(PoisonError::into_inner) = fresh;
            }
            Err(e) => warn!(dict = ?self.dict_type, "dictionary load failed: {e}"),
        }
    }
}

/// Clears `updating` even if the loader panics, so waiters never hang.
struct UpdatingGuard<'a>(&'a Shared);

impl Drop for UpdatingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock_state().updating = false;
        self.0.loaded.notify_all();
    }
}

/// A trie plus its load/reload discipline.
///
/// Cloning yields another handle to the same dictionary. Queries never wait
/// for a load: while one is in flight they return nothing.
#[derive(Clone)]
pub struct TrieStore {
    shared: Arc<Shared>,
}

impl TrieStore {
    /// An in-memory dictionary without a backing source.
    pub fn new(dict_type: DictType) -> Self {
        Self::build(dict_type, Trie::new(), None)
    }

    /// Wrap an already built trie.
    pub fn with_trie(dict_type: DictType, trie: Trie) -> Self {
        Self::build(dict_type, trie, None)
    }

    /// A dictionary filled by `loader` on the first query (or on `load`).
    pub fn with_loader(dict_type: DictType, loader: impl DictionaryLoader + 'static) -> Self {
        let loader: Arc<dyn DictionaryLoader> = Arc::new(loader);
        let store = Self::build(dict_type, Trie::new(), Some(loader));
        store.shared.lock_state().requires_reload = true;
        store
    }

    fn build(dict_type: DictType, trie: Trie, loader: Option<Arc<dyn DictionaryLoader>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                dict_type,
                trie: RwLock::new(trie),
                state: Mutex::new(LoadState::default()),
                loaded: Condvar::new(),
                loader,
                validity_threshold: AtomicI32::new(0),
                include_typed_word: AtomicBool::new(false),
            }),
        }
    }

    pub fn dict_type(&self) -> DictType {
        self.shared.dict_type
    }

    /// Minimum frequency for [`is_valid_word`](Self::is_valid_word).
    pub fn set_validity_threshold(&self, threshold: i32) {
        self.shared
            .validity_threshold
            .store(threshold, Ordering::Relaxed);
    }

    /// Whether the fuzzy search may return the literal typed word itself.
    pub fn set_include_typed_word(&self, include: bool) {
        self.shared
            .include_typed_word
            .store(include, Ordering::Relaxed);
    }

    // -----------------------------------------------------------------------
    // Load state
    // -----------------------------------------------------------------------

    /// Start a background load unless one is already running.
    pub fn load(&self) {
        let mut state = self.shared.lock_state();
        self.start_loading_locked(&mut state);
    }

    pub fn set_requires_reload(&self, reload: bool) {
        self.shared.lock_state().requires_reload = reload;
    }

    pub fn requires_reload(&self) -> bool {
        self.shared.lock_state().requires_reload
    }

    pub fn is_updating(&self) -> bool {
        self.shared.lock_state().updating
    }

    /// Block until no load is in flight.
    pub fn wait_for_loading(&self) {
        let state = self.shared.lock_state();
        self.wait_locked(state);
    }

    /// Run a reload that is due, then block until no load is in flight.
    /// Writers call this so their update lands in the trie queries see.
    pub fn ensure_loaded(&self) {
        let mut state = self.shared.lock_state();
        if state.requires_reload {
            self.start_loading_locked(&mut state);
        }
        self.wait_locked(state);
    }

    fn wait_locked(&self, mut state: MutexGuard<'_, LoadState>) {
        while state.updating {
            state = self
                .shared
                .loaded
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn start_loading_locked(&self, state: &mut LoadState) {
        if state.updating {
            return;
        }
        state.requires_reload = false;
        let Some(loader) = self.shared.loader.clone() else {
            return;
        };
        state.updating = true;
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("keysuggest-load-{:?}", self.shared.dict_type).to_lowercase())
            .spawn(move || shared.run_load(loader.as_ref()));
        if let Err(e) = spawned {
            warn!("failed to spawn dictionary loader: {e}");
            state.updating = false;
        }
    }

    /// Reload gate shared by every query entry point.
    fn query_allowed(&self) -> bool {
        let mut state = self.shared.lock_state();
        if state.requires_reload {
            self.start_loading_locked(&mut state);
        }
        !state.updating
    }

    fn read_trie(&self) -> RwLockReadGuard<'_, Trie> {
        self.shared
            .trie
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    pub fn add_word(&self, word: &str, frequency: i32) {
        self.write(|trie| trie.add_word(word, frequency));
    }

    pub fn add_bigram(&self, word1: &str, word2: &str, delta: i32) -> Option<i32> {
        self.write(|trie| trie.add_bigram(word1, word2, delta))
    }

    pub fn set_bigram(&self, word1: &str, word2: &str, frequency: i32) -> Option<i32> {
        self.write(|trie| trie.set_bigram(word1, word2, frequency))
    }

    /// Swap in a new trie wholesale.
    pub fn replace(&self, trie: Trie) {
        self.write(|current| *current = trie);
    }

    pub fn clear(&self) {
        self.write(Trie::clear);
    }

    fn write<R>(&self, f: impl FnOnce(&mut Trie) -> R) -> R {
        let mut trie = self
            .shared
            .trie
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut trie)
    }

    /// Run `f` against the current trie.
    pub fn read<R>(&self, f: impl FnOnce(&Trie) -> R) -> R {
        let trie = self.read_trie();
        f(&*trie)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Stored frequency, ignoring the reload gate.
    pub fn word_frequency(&self, word: &str) -> Option<u8> {
        self.read_trie().word_frequency(word)
    }

    /// Whether `word` is stored with at least the validity threshold.
    /// Always `false` while a load is in flight.
    pub fn is_valid_word(&self, word: &str) -> bool {
        if !self.query_allowed() {
            return false;
        }
        let threshold = self.shared.validity_threshold.load(Ordering::Relaxed);
        self.word_frequency(word)
            .is_some_and(|freq| i32::from(freq) >= threshold)
    }

    /// Fuzzy completion/correction search for the composer's keystrokes.
    pub fn get_words<C: WordCallback>(
        &self,
        composer: &Composer,
        callback: &mut C,
        next_letters: Option<&mut NextLetterFrequencies>,
    ) {
        self.search(composer, callback, next_letters, false);
    }

    /// [`get_words`](Self::get_words), optionally also emitting an exact
    /// match of the typed word.
    pub(crate) fn search<C: WordCallback>(
        &self,
        composer: &Composer,
        callback: &mut C,
        next_letters: Option<&mut NextLetterFrequencies>,
        include_typed_word: bool,
    ) {
        if !self.query_allowed() {
            return;
        }
        let trie = self.read_trie();
        let include_typed =
            include_typed_word || self.shared.include_typed_word.load(Ordering::Relaxed);
        FuzzyWalk::new(
            &*trie,
            composer,
            self.shared.dict_type,
            &settings().scoring,
            include_typed,
            callback,
            next_letters,
        )
        .run();
    }

    /// Emit every sufficiently frequent word recorded after `previous_word`.
    pub fn get_bigrams<C: WordCallback>(&self, previous_word: &str, callback: &mut C) {
        if previous_word.is_empty() || !self.query_allowed() {
            return;
        }
        let threshold = settings().scoring.bigram_suggest_threshold;
        let trie = self.read_trie();
        let Some(prev) = trie
            .find(previous_word)
            .or_else(|| trie.find(&previous_word.to_lowercase()))
        else {
            return;
        };
        for next in &trie.node(prev).bigrams {
            if next.frequency < threshold {
                continue;
            }
            let word: Vec<char> = trie.word_at(next.word).chars().collect();
            if !callback.add_word(
                &word,
                i64::from(next.frequency),
                self.shared.dict_type,
                DataType::Bigram,
            ) {
                break;
            }
        }
    }

    pub fn word_count(&self) -> usize {
        self.read_trie().word_count()
    }

    /// Byte size of the blob backing this dictionary.
    pub fn size(&self) -> usize {
        self.read_trie().size()
    }
}
