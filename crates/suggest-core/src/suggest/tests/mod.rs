mod proptest_ranked;

use crate::composer::Composer;
use crate::dict::{DictType, Trie, TrieStore};

use super::Suggest;

pub(super) fn store(dict_type: DictType, words: &[(&str, i32)]) -> TrieStore {
    let mut trie = Trie::new();
    for &(word, freq) in words {
        trie.add_word(word, freq);
    }
    TrieStore::with_trie(dict_type, trie)
}

pub(super) fn suggest_with(words: &[(&str, i32)]) -> Suggest {
    Suggest::new(store(DictType::Main, words))
}

pub(super) fn typed(word: &str) -> Composer {
    Composer::from_typed(word)
}
