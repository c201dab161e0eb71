//! Row stores behind the learning dictionaries.
//!
//! The file-backed stores keep their rows in memory and rewrite the whole
//! file (magic + version header, bincode body) after every change.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::settings::settings;

use super::StoreError;

const BIGRAM_MAGIC: &[u8; 4] = b"KSBG";
const WORD_MAGIC: &[u8; 4] = b"KSWD";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigramRow {
    pub word1: String,
    pub word2: String,
    pub frequency: i32,
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRow {
    pub word: String,
    pub frequency: i32,
    pub locale: String,
}

/// One learned-word update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordChange {
    Upsert { word: String, frequency: i32 },
    Delete { word: String },
}

pub trait BigramStore: Send + Sync {
    /// All rows of `locale`, oldest first.
    fn load_bigrams(&self, locale: &str) -> Result<Vec<BigramRow>, StoreError>;

    /// Insert new pairs and overwrite the frequency of known ones.
    fn upsert_bigrams(&self, rows: &[BigramRow]) -> Result<(), StoreError>;
}

pub trait WordStore: Send + Sync {
    /// All rows of `locale`, oldest first.
    fn load_words(&self, locale: &str) -> Result<Vec<WordRow>, StoreError>;

    fn apply_words(&self, locale: &str, changes: &[WordChange]) -> Result<(), StoreError>;
}

/// Drop the oldest rows once the table outgrew its cap.
fn prune<R>(rows: &mut Vec<R>) {
    let learning = &settings().learning;
    if rows.len() > learning.max_rows {
        let excess = learning.prune_rows.min(rows.len());
        rows.drain(..excess);
    }
}

fn upsert_bigram_rows(rows: &mut Vec<BigramRow>, updates: &[BigramRow]) {
    for update in updates {
        let existing = rows.iter_mut().find(|r| {
            r.word1 == update.word1 && r.word2 == update.word2 && r.locale == update.locale
        });
        match existing {
            Some(row) => row.frequency = update.frequency,
            None => rows.push(update.clone()),
        }
    }
    prune(rows);
}

fn apply_word_changes(rows: &mut Vec<WordRow>, locale: &str, changes: &[WordChange]) {
    for change in changes {
        match change {
            WordChange::Upsert { word, frequency } => {
                let existing = rows
                    .iter_mut()
                    .find(|r| r.word == *word && r.locale == locale);
                match existing {
                    Some(row) => row.frequency = *frequency,
                    None => rows.push(WordRow {
                        word: word.clone(),
                        frequency: *frequency,
                        locale: locale.to_string(),
                    }),
                }
            }
            WordChange::Delete { word } => {
                rows.retain(|r| !(r.word == *word && r.locale == locale));
            }
        }
    }
    prune(rows);
}

fn lock_rows<R>(rows: &Mutex<Vec<R>>) -> MutexGuard<'_, Vec<R>> {
    rows.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// In-memory stores
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryBigramStore {
    rows: Mutex<Vec<BigramRow>>,
}

impl MemoryBigramStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<BigramRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// Snapshot of every row, all locales.
    pub fn rows(&self) -> Vec<BigramRow> {
        lock_rows(&self.rows).clone()
    }
}

impl BigramStore for MemoryBigramStore {
    fn load_bigrams(&self, locale: &str) -> Result<Vec<BigramRow>, StoreError> {
        Ok(lock_rows(&self.rows)
            .iter()
            .filter(|r| r.locale == locale)
            .cloned()
            .collect())
    }

    fn upsert_bigrams(&self, rows: &[BigramRow]) -> Result<(), StoreError> {
        upsert_bigram_rows(&mut lock_rows(&self.rows), rows);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryWordStore {
    rows: Mutex<Vec<WordRow>>,
}

impl MemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<WordRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub fn rows(&self) -> Vec<WordRow> {
        lock_rows(&self.rows).clone()
    }
}

impl WordStore for MemoryWordStore {
    fn load_words(&self, locale: &str) -> Result<Vec<WordRow>, StoreError> {
        Ok(lock_rows(&self.rows)
            .iter()
            .filter(|r| r.locale == locale)
            .cloned()
            .collect())
    }

    fn apply_words(&self, locale: &str, changes: &[WordChange]) -> Result<(), StoreError> {
        apply_word_changes(&mut lock_rows(&self.rows), locale, changes);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed stores
// ---------------------------------------------------------------------------

fn encode_rows<R: Serialize>(magic: &[u8; 4], rows: &[R]) -> Result<Vec<u8>, StoreError> {
    let body = bincode::serialize(rows).map_err(StoreError::Serialize)?;
    let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
    buf.extend_from_slice(magic);
    buf.push(VERSION);
    buf.extend_from_slice(&body);
    Ok(buf)
}

fn decode_rows<R: DeserializeOwned>(magic: &[u8; 4], bytes: &[u8]) -> Result<Vec<R>, StoreError> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::InvalidHeader);
    }
    if &bytes[..4] != magic {
        return Err(StoreError::InvalidMagic);
    }
    if bytes[4] != VERSION {
        return Err(StoreError::UnsupportedVersion(bytes[4]));
    }
    bincode::deserialize(&bytes[HEADER_SIZE..]).map_err(StoreError::Deserialize)
}

/// Read rows from `path`; a missing file is an empty table.
fn read_rows<R: DeserializeOwned>(magic: &[u8; 4], path: &Path) -> Result<Vec<R>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => decode_rows(magic, &bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Atomic write: write to .tmp then rename.
fn write_rows<R: Serialize>(magic: &[u8; 4], path: &Path, rows: &[R]) -> Result<(), StoreError> {
    let bytes = encode_rows(magic, rows)?;
    let tmp = path.with_extension("tmp");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub struct FileBigramStore {
    path: PathBuf,
    rows: Mutex<Vec<BigramRow>>,
}

impl FileBigramStore {
    /// Open the table at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let rows = read_rows(BIGRAM_MAGIC, &path)?;
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of every row, all locales.
    pub fn rows(&self) -> Vec<BigramRow> {
        lock_rows(&self.rows).clone()
    }

    pub fn len(&self) -> usize {
        lock_rows(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        lock_rows(&self.rows).is_empty()
    }
}

impl BigramStore for FileBigramStore {
    fn load_bigrams(&self, locale: &str) -> Result<Vec<BigramRow>, StoreError> {
        Ok(lock_rows(&self.rows)
            .iter()
            .filter(|r| r.locale == locale)
            .cloned()
            .collect())
    }

    fn upsert_bigrams(&self, rows: &[BigramRow]) -> Result<(), StoreError> {
        let mut table = lock_rows(&self.rows);
        upsert_bigram_rows(&mut table, rows);
        write_rows(BIGRAM_MAGIC, &self.path, table.as_slice())
    }
}

pub struct FileWordStore {
    path: PathBuf,
    rows: Mutex<Vec<WordRow>>,
}

impl FileWordStore {
    /// Open the table at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let rows = read_rows(WORD_MAGIC, &path)?;
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> Vec<WordRow> {
        lock_rows(&self.rows).clone()
    }

    pub fn len(&self) -> usize {
        lock_rows(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        lock_rows(&self.rows).is_empty()
    }
}

impl WordStore for FileWordStore {
    fn load_words(&self, locale: &str) -> Result<Vec<WordRow>, StoreError> {
        Ok(lock_rows(&self.rows)
            .iter()
            .filter(|r| r.locale == locale)
            .cloned()
            .collect())
    }

    fn apply_words(&self, locale: &str, changes: &[WordChange]) -> Result<(), StoreError> {
        let mut table = lock_rows(&self.rows);
        apply_word_changes(&mut table, locale, changes);
        write_rows(WORD_MAGIC, &self.path, table.as_slice())
    }
}
