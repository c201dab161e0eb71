use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use suggest_core::composer::Composer;
use suggest_core::dict::TrieStore;
use suggest_core::learning::{AddOutcome, AutoDictionary, UserBigramDictionary, UserDictionary};
use suggest_core::suggest::{CorrectionMode, Suggest, SuggestError};
use tracing::{debug, debug_span, warn};

use crate::async_worker::AsyncWorker;

use super::{AsyncSuggestions, EngineError, EngineResources, SuggestionResponse};

/// The suggestion engine of one keyboard session: the dictionaries, the
/// collector querying them and the dictionaries learning from the user.
pub struct SuggestEngine {
    suggest: Arc<Mutex<Suggest>>,
    main: TrieStore,
    user: UserDictionary,
    contacts: Option<TrieStore>,
    auto: AutoDictionary,
    user_bigram: UserBigramDictionary,
    worker: AsyncWorker,
    writers: Mutex<Vec<JoinHandle<()>>>,
}

impl SuggestEngine {
    pub fn new(resources: EngineResources) -> Result<Self, EngineError> {
        let EngineResources {
            locale,
            main,
            contacts,
            auto_text,
            word_store,
            user_store,
            bigram_store,
        } = resources;
        let _span = debug_span!("engine_new", %locale).entered();

        let user = UserDictionary::new(locale.as_str(), user_store);
        let auto = AutoDictionary::new(locale.as_str(), word_store);
        let user_bigram = UserBigramDictionary::new(locale, bigram_store);
        // Learned words must not race the initial load of their tables.
        user.dictionary().load();
        auto.dictionary().load();
        user_bigram.dictionary().load();
        main.load();

        let mut suggest = Suggest::new(main.clone());
        suggest.set_user_dictionary(Some(user.dictionary().clone()));
        suggest.set_contacts_dictionary(contacts.clone());
        suggest.set_auto_dictionary(Some(auto.dictionary().clone()));
        suggest.set_user_bigram_dictionary(Some(user_bigram.dictionary().clone()));
        suggest.set_auto_text(auto_text);
        let suggest = Arc::new(Mutex::new(suggest));

        let worker = AsyncWorker::new(Arc::clone(&suggest))
            .map_err(|e| EngineError::Internal { msg: e.to_string() })?;

        Ok(Self {
            suggest,
            main,
            user,
            contacts,
            auto,
            user_bigram,
            worker,
            writers: Mutex::new(Vec::new()),
        })
    }

    fn lock_suggest(&self) -> MutexGuard<'_, Suggest> {
        self.suggest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    pub fn correction_mode(&self) -> CorrectionMode {
        self.lock_suggest().correction_mode()
    }

    pub fn set_correction_mode(&self, mode: CorrectionMode) {
        self.lock_suggest().set_correction_mode(mode);
    }

    pub fn set_max_suggestions(&self, max: usize) -> Result<(), SuggestError> {
        self.lock_suggest().set_max_suggestions(max)
    }

    pub fn has_main_dictionary(&self) -> bool {
        self.lock_suggest().has_main_dictionary()
    }

    pub fn is_valid_word(&self, word: &str) -> bool {
        self.lock_suggest().is_valid_word(word)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Suggestions for `composer`, computed on the calling thread.
    pub fn suggestions(&self, composer: &Composer, previous_word: Option<&str>) -> SuggestionResponse {
        let mut suggest = self.lock_suggest();
        let words = suggest.get_suggestions(composer, false, previous_word);
        SuggestionResponse {
            words,
            has_correction: suggest.has_minimal_correction(),
        }
    }

    /// Queue a query on the worker thread. Returns the generation the
    /// result will carry; earlier queries still pending are abandoned.
    pub fn submit(&self, composer: &Composer, previous_word: Option<&str>) -> u64 {
        self.worker
            .submit(composer.clone(), previous_word.map(str::to_string))
    }

    /// Abandon any query in flight.
    pub fn invalidate(&self) {
        self.worker.invalidate();
    }

    pub fn try_recv(&self) -> Option<AsyncSuggestions> {
        self.worker.try_recv().map(|r| AsyncSuggestions {
            generation: r.generation,
            response: r.response,
        })
    }

    // -----------------------------------------------------------------------
    // Learning
    // -----------------------------------------------------------------------

    /// Known to the main, user or contacts dictionary.
    fn is_known(&self, word: &str) -> bool {
        self.main.is_valid_word(word)
            || self.user.dictionary().is_valid_word(word)
            || self.contacts.as_ref().is_some_and(|c| c.is_valid_word(word))
    }

    /// Count a committed word. Words already known elsewhere are only
    /// counted if the auto dictionary is tracking them already.
    pub fn learn_word(&self, word: &str, picked: bool, auto_capitalized: bool) -> AddOutcome {
        if word.is_empty() {
            return AddOutcome::Ignored;
        }
        let tracked = self.auto.is_valid_word(word);
        if !tracked && (self.is_known(word) || self.is_known(&word.to_lowercase())) {
            return AddOutcome::Ignored;
        }
        let delta = if picked {
            AutoDictionary::FREQUENCY_FOR_PICKED
        } else {
            AutoDictionary::FREQUENCY_FOR_TYPED
        };
        let outcome = self.auto.add_word(word, delta, auto_capitalized);
        if let AddOutcome::Promoted { word, frequency } = &outcome {
            debug!(%word, "promoting to user dictionary");
            self.user.add_word(word, *frequency);
        }
        outcome
    }

    /// Record that `word` followed `previous_word`.
    pub fn learn_bigram(
        &self,
        previous_word: &str,
        word: &str,
        auto_capitalized: bool,
    ) -> Option<i32> {
        self.user_bigram
            .add_bigram(previous_word, word, auto_capitalized)
    }

    /// Persist learned data in the background.
    pub fn on_focus_lost(&self) {
        let handles = [
            self.user.flush_pending_writes(),
            self.auto.flush_pending_writes(),
            self.user_bigram.flush_pending_writes(),
        ];
        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        writers.retain(|h| !h.is_finished());
        writers.extend(handles.into_iter().flatten());
    }

    /// Wait for loads in flight, flush pending writes and wait for every
    /// writer to finish.
    pub fn close(&self) {
        self.invalidate();
        for dict in [
            &self.main,
            self.user.dictionary(),
            self.auto.dictionary(),
            self.user_bigram.dictionary(),
        ] {
            dict.wait_for_loading();
        }
        if let Some(contacts) = &self.contacts {
            contacts.wait_for_loading();
        }
        self.on_focus_lost();
        let writers = std::mem::take(
            &mut *self.writers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for handle in writers {
            if handle.join().is_err() {
                warn!("learning writer panicked");
            }
        }
    }

    pub fn auto_dictionary(&self) -> &AutoDictionary {
        &self.auto
    }

    pub fn user_bigram_dictionary(&self) -> &UserBigramDictionary {
        &self.user_bigram
    }

    pub fn user_dictionary(&self) -> &TrieStore {
        self.user.dictionary()
    }
}
