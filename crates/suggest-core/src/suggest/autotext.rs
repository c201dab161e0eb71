use std::collections::HashMap;

/// Locale shorthand table ("teh" → "the", "im" → "I'm").
pub trait AutoText: Send + Sync {
    /// Expansion for a lowercased word, if any.
    fn lookup(&self, word: &str) -> Option<String>;
}

/// In-memory [`AutoText`] backed by a map.
#[derive(Debug, Clone, Default)]
pub struct AutoTextTable {
    entries: HashMap<String, String>,
}

impl AutoTextTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: impl Into<String>, expansion: impl Into<String>) {
        self.entries.insert(word.into(), expansion.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AutoTextTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (word, expansion) in iter {
            table.insert(word, expansion);
        }
        table
    }
}

impl AutoText for AutoTextTable {
    fn lookup(&self, word: &str) -> Option<String> {
        self.entries.get(word).cloned()
    }
}
