mod store;

use super::Trie;

/// "th" fixture shared by the search tests.
fn th_trie() -> Trie {
    let mut trie = Trie::new();
    trie.add_word("the", 200);
    trie.add_word("there", 150);
    trie.add_word("then", 120);
    trie.add_word("this", 100);
    trie.add_word("a", 180);
    trie
}
