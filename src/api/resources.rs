use std::path::Path;
use std::sync::Arc;

use suggest_core::dict::{BlobLoader, DictType, TrieStore};
use suggest_core::learning::{
    BigramStore, FileBigramStore, FileWordStore, MemoryBigramStore, MemoryWordStore, WordStore,
};
use suggest_core::suggest::AutoText;

use super::EngineError;

pub const AUTO_WORDS_FILE: &str = "auto_words.ksw";
pub const USER_BIGRAMS_FILE: &str = "user_bigrams.ksb";
pub const USER_WORDS_FILE: &str = "user_words.ksw";

/// Everything a [`SuggestEngine`](super::SuggestEngine) is built from.
pub struct EngineResources {
    pub locale: String,
    pub main: TrieStore,
    pub contacts: Option<TrieStore>,
    pub auto_text: Option<Arc<dyn AutoText>>,
    pub word_store: Arc<dyn WordStore>,
    pub user_store: Arc<dyn WordStore>,
    pub bigram_store: Arc<dyn BigramStore>,
}

impl EngineResources {
    /// Main dictionary blob at `main_dict`, learned data under `data_dir`.
    pub fn open(
        locale: impl Into<String>,
        main_dict: &Path,
        data_dir: &Path,
    ) -> Result<Self, EngineError> {
        if !main_dict.is_file() {
            return Err(EngineError::Io {
                msg: format!("{}: not a file", main_dict.display()),
            });
        }
        let word_store = FileWordStore::open(data_dir.join(AUTO_WORDS_FILE))
            .map_err(|e| EngineError::InvalidData { msg: e.to_string() })?;
        let user_store = FileWordStore::open(data_dir.join(USER_WORDS_FILE))
            .map_err(|e| EngineError::InvalidData { msg: e.to_string() })?;
        let bigram_store = FileBigramStore::open(data_dir.join(USER_BIGRAMS_FILE))
            .map_err(|e| EngineError::InvalidData { msg: e.to_string() })?;
        Ok(Self {
            locale: locale.into(),
            main: TrieStore::with_loader(DictType::Main, BlobLoader::from_path(main_dict)),
            contacts: None,
            auto_text: None,
            word_store: Arc::new(word_store),
            user_store: Arc::new(user_store),
            bigram_store: Arc::new(bigram_store),
        })
    }

    /// Learned data kept in memory only.
    pub fn in_memory(locale: impl Into<String>, main: TrieStore) -> Self {
        Self {
            locale: locale.into(),
            main,
            contacts: None,
            auto_text: None,
            word_store: Arc::new(MemoryWordStore::new()),
            user_store: Arc::new(MemoryWordStore::new()),
            bigram_store: Arc::new(MemoryBigramStore::new()),
        }
    }

    pub fn with_contacts(mut self, contacts: TrieStore) -> Self {
        self.contacts = Some(contacts);
        self
    }

    pub fn with_auto_text(mut self, auto_text: Arc<dyn AutoText>) -> Self {
        self.auto_text = Some(auto_text);
        self
    }
}
