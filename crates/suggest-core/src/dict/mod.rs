//! Word/bigram storage and the fuzzy search over it.
//!
//! `Trie` is the node arena holding words, frequencies and bigram links.
//! `TrieStore` wraps a trie with the load/reload discipline shared by every
//! dictionary source (main, user, contacts, auto-learned, user bigrams).

mod fuzzy;
pub mod source;
mod store;
#[cfg(test)]
mod tests;
mod trie;
mod trie_io;

pub use fuzzy::NextLetterFrequencies;
pub use store::{BlobLoader, DictionaryLoader, TrieStore};
pub use trie::{NodeId, Trie};

use std::io;

/// Words of this many characters or more are never stored.
pub const MAX_WORD_LENGTH: usize = 32;

/// Upper bound of a stored unigram frequency.
pub const MAX_UNIGRAM_FREQUENCY: u8 = 255;

/// Which dictionary produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictType {
    UserTyped = 0,
    Main = 1,
    User = 2,
    Auto = 3,
    Contacts = 4,
}

/// Whether a candidate came from the unigram search or a bigram lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Unigram,
    Bigram,
}

/// Receiver of search results.
pub trait WordCallback {
    /// Offer a candidate. Returning `false` stops the current walk.
    fn add_word(&mut self, word: &[char], frequency: i64, dict: DictType, data: DataType) -> bool;
}

impl<F> WordCallback for F
where
    F: FnMut(&[char], i64, DictType, DataType) -> bool,
{
    fn add_word(&mut self, word: &[char], frequency: i64, dict: DictType, data: DataType) -> bool {
        self(word, frequency, dict, data)
    }
}

/// Error type for dictionary blob and word-list I/O.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected KSDX)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("checksum mismatch (expected {expected:08x}, got {actual:08x})")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("invalid node link at node {node}")]
    InvalidNodeLink { node: usize },

    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Failure of a background dictionary load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Dict(#[from] DictError),

    #[error(transparent)]
    Store(#[from] crate::learning::StoreError),

    #[error("{0}")]
    Other(String),
}
