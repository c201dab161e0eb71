use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use super::th_trie;
use crate::composer::Composer;
use crate::dict::{BlobLoader, DataType, DictType, LoadError, Trie, TrieStore};

fn bigrams_of(store: &TrieStore, previous: &str) -> Vec<(String, i64)> {
    let mut out = Vec::new();
    let mut collect = |word: &[char], freq: i64, _: DictType, data: DataType| {
        assert_eq!(data, DataType::Bigram);
        out.push((word.iter().collect(), freq));
        true
    };
    store.get_bigrams(previous, &mut collect);
    out
}

fn word_count_found(store: &TrieStore, typed: &str) -> usize {
    let mut count = 0;
    let mut collect = |_: &[char], _: i64, _: DictType, _: DataType| {
        count += 1;
        true
    };
    store.get_words(&Composer::from_typed(typed), &mut collect, None);
    count
}

#[test]
fn test_in_memory_store() {
    let store = TrieStore::new(DictType::User);
    store.add_word("hello", 120);
    assert!(store.is_valid_word("hello"));
    assert!(!store.is_valid_word("help"));
    assert_eq!(store.word_frequency("hello"), Some(120));
    assert_eq!(store.word_count(), 1);
    assert!(!store.requires_reload());
    assert!(!store.is_updating());
}

#[test]
fn test_clones_share_data() {
    let store = TrieStore::new(DictType::Contacts);
    let other = store.clone();
    other.add_word("Alice", 128);
    assert!(store.is_valid_word("Alice"));
    store.clear();
    assert_eq!(other.word_count(), 0);
}

#[test]
fn test_validity_threshold() {
    let store = TrieStore::new(DictType::Auto);
    store.add_word("rarely", 3);
    store.add_word("often", 9);
    store.set_validity_threshold(6);
    assert!(!store.is_valid_word("rarely"));
    assert!(store.is_valid_word("often"));
}

#[test]
fn test_bigram_threshold() {
    let store = TrieStore::new(DictType::User);
    store.set_bigram("good", "morning", 40);
    store.set_bigram("good", "night", 12);
    store.set_bigram("good", "grief", 11);
    let mut found = bigrams_of(&store, "good");
    found.sort();
    assert_eq!(
        found,
        vec![("morning".to_string(), 40), ("night".to_string(), 12)]
    );
}

#[test]
fn test_bigrams_fall_back_to_lowercase() {
    let store = TrieStore::new(DictType::User);
    store.add_bigram("Good", "morning", 20);
    assert_eq!(bigrams_of(&store, "Good"), vec![("morning".to_string(), 20)]);
    assert!(bigrams_of(&store, "bad").is_empty());
    assert!(bigrams_of(&store, "").is_empty());
}

#[test]
fn test_reload_skips_queries_until_loaded() {
    let (release, gate) = mpsc::channel::<()>();
    let gate = Mutex::new(gate);
    let store = TrieStore::with_loader(DictType::Main, move |trie: &mut Trie| -> Result<(), LoadError> {
        let _ = gate.lock().unwrap().recv();
        trie.add_word("hello", 100);
        Ok(())
    });
    assert!(store.requires_reload());

    // The first query kicks off the load and comes back empty.
    assert!(!store.is_valid_word("hello"));
    assert!(store.is_updating());
    assert!(!store.requires_reload());
    assert_eq!(word_count_found(&store, "hel"), 0);
    assert!(bigrams_of(&store, "hello").is_empty());

    release.send(()).unwrap();
    store.wait_for_loading();
    assert!(!store.is_updating());
    assert!(store.is_valid_word("hello"));
    assert!(word_count_found(&store, "hel") > 0);
}

#[test]
fn test_failed_reload_keeps_previous_trie() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let store = TrieStore::with_loader(DictType::User, move |trie: &mut Trie| -> Result<(), LoadError> {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            trie.add_word("kept", 50);
            Ok(())
        } else {
            Err(LoadError::Other("backing store unavailable".to_string()))
        }
    });
    store.load();
    store.wait_for_loading();
    assert!(store.is_valid_word("kept"));

    store.set_requires_reload(true);
    assert!(!store.is_valid_word("kept"));
    store.wait_for_loading();
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert!(store.is_valid_word("kept"));
}

#[test]
fn test_load_while_loading_is_noop() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let (release, gate) = mpsc::channel::<()>();
    let gate = Mutex::new(gate);
    let store = TrieStore::with_loader(DictType::Main, move |_: &mut Trie| -> Result<(), LoadError> {
        counter.fetch_add(1, Ordering::SeqCst);
        let _ = gate.lock().unwrap().recv();
        Ok(())
    });
    store.load();
    store.load();
    assert!(store.is_updating());
    release.send(()).unwrap();
    store.wait_for_loading();
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_ensure_loaded_runs_due_reload() {
    let store = TrieStore::with_loader(DictType::Auto, |trie: &mut Trie| -> Result<(), LoadError> {
        trie.add_word("brb", 5);
        Ok(())
    });
    assert_eq!(store.word_frequency("brb"), None);
    store.ensure_loaded();
    assert!(!store.requires_reload());
    assert!(!store.is_updating());
    assert_eq!(store.word_frequency("brb"), Some(5));

    // Nothing due: no reload, later writes survive.
    store.add_word("imo", 2);
    store.ensure_loaded();
    assert_eq!(store.word_frequency("imo"), Some(2));
}

#[test]
fn test_store_without_loader_ignores_reload() {
    let store = TrieStore::with_trie(DictType::Main, th_trie());
    store.set_requires_reload(true);
    assert!(store.is_valid_word("the"));
    assert!(!store.requires_reload());
}

#[test]
fn test_blob_loader_from_bytes() {
    let bytes = th_trie().to_bytes().unwrap();
    let len = bytes.len();
    let store = TrieStore::with_loader(DictType::Main, BlobLoader::from_bytes(bytes));
    store.load();
    store.wait_for_loading();
    assert!(store.is_valid_word("there"));
    assert_eq!(store.size(), len);
}

#[test]
fn test_blob_loader_bad_bytes_keeps_empty_trie() {
    let store = TrieStore::with_loader(DictType::Main, BlobLoader::from_bytes(b"junk".to_vec()));
    store.load();
    store.wait_for_loading();
    assert_eq!(store.word_count(), 0);
    assert_eq!(store.size(), 0);
}

#[test]
fn test_blob_loader_from_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("main.dict");
    th_trie().save(&path).unwrap();
    let store = TrieStore::with_loader(DictType::Main, BlobLoader::from_path(&path));
    store.load();
    store.wait_for_loading();
    assert_eq!(store.word_frequency("then"), Some(120));
}

#[test]
fn test_replace() {
    let store = TrieStore::new(DictType::Main);
    store.replace(th_trie());
    assert_eq!(store.read(|trie| trie.word_count()), 5);
}
