/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked {
    pub word: String,
    pub priority: i64,
}

/// Bounded best-N list: descending priority, shorter word first on ties.
#[derive(Debug, Clone)]
pub struct RankedList {
    capacity: usize,
    entries: Vec<Ranked>,
}

impl RankedList {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the bound, dropping overflow from the tail.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.entries.truncate(capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Insert by priority. Returns `false` when the candidate did not make
    /// the cut: it does not beat the last slot of a full list, or its
    /// priority is not positive (empty slots rank at 0).
    pub fn insert(&mut self, word: String, priority: i64) -> bool {
        let floor = match self.entries.last() {
            Some(last) if self.entries.len() >= self.capacity => last.priority,
            _ => 0,
        };
        if floor >= priority {
            return false;
        }
        let len = word.chars().count();
        let pos = self
            .entries
            .iter()
            .position(|e| {
                e.priority < priority || (e.priority == priority && len < e.word.chars().count())
            })
            .unwrap_or(self.entries.len());
        if pos >= self.capacity {
            return false;
        }
        self.entries.insert(pos, Ranked { word, priority });
        self.entries.truncate(self.capacity);
        true
    }

    /// Put a candidate at rank 0 regardless of priority.
    pub fn insert_first(&mut self, word: String, priority: i64) {
        if self.capacity == 0 {
            return;
        }
        self.entries.insert(0, Ranked { word, priority });
        self.entries.truncate(self.capacity);
    }

    /// Append without ranking, used to seed the list from bigrams.
    /// Returns `false` once the list is full.
    pub fn push_unranked(&mut self, word: String) -> bool {
        if self.entries.len() >= self.capacity {
            return false;
        }
        self.entries.push(Ranked { word, priority: 0 });
        true
    }

    /// Priority of `word` (exact match), if present.
    pub fn priority_of(&self, word: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|e| e.word == word)
            .map(|e| e.priority)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ranked> {
        self.entries.iter()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.word.as_str())
    }

    /// Move the words out, leaving the list empty.
    pub fn take_words(&mut self) -> Vec<String> {
        self.entries.drain(..).map(|e| e.word).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &RankedList) -> Vec<&str> {
        list.words().collect()
    }

    #[test]
    fn test_descending_priority() {
        let mut list = RankedList::new(4);
        assert!(list.insert("b".into(), 20));
        assert!(list.insert("a".into(), 30));
        assert!(list.insert("c".into(), 10));
        assert_eq!(words(&list), ["a", "b", "c"]);
    }

    #[test]
    fn test_shorter_wins_ties() {
        let mut list = RankedList::new(4);
        list.insert("cake".into(), 40);
        list.insert("cab".into(), 40);
        list.insert("cabin".into(), 40);
        assert_eq!(words(&list), ["cab", "cake", "cabin"]);
    }

    #[test]
    fn test_equal_length_tie_keeps_arrival_order() {
        let mut list = RankedList::new(4);
        list.insert("bat".into(), 5);
        list.insert("cat".into(), 5);
        assert_eq!(words(&list), ["bat", "cat"]);
    }

    #[test]
    fn test_full_list_rejects_weaker() {
        let mut list = RankedList::new(2);
        list.insert("a".into(), 30);
        list.insert("b".into(), 20);
        assert!(!list.insert("c".into(), 20));
        assert!(!list.insert("d".into(), 5));
        assert!(list.insert("e".into(), 25));
        assert_eq!(words(&list), ["a", "e"]);
    }

    #[test]
    fn test_non_positive_rejected() {
        let mut list = RankedList::new(3);
        assert!(!list.insert("zero".into(), 0));
        assert!(!list.insert("neg".into(), -4));
        assert!(list.is_empty());
    }

    #[test]
    fn test_insert_first_bypasses_ranking() {
        let mut list = RankedList::new(2);
        list.insert("a".into(), 30);
        list.insert("b".into(), 20);
        list.insert_first("Z".into(), 1);
        assert_eq!(words(&list), ["Z", "a"]);
        assert_eq!(list.priority_of("Z"), Some(1));
        assert_eq!(list.priority_of("b"), None);
    }

    #[test]
    fn test_zero_capacity() {
        let mut list = RankedList::new(0);
        assert!(!list.insert("a".into(), 10));
        list.insert_first("b".into(), 10);
        assert!(!list.push_unranked("c".into()));
        assert!(list.is_empty());
    }

    #[test]
    fn test_push_unranked_and_take() {
        let mut list = RankedList::new(2);
        assert!(list.push_unranked("x".into()));
        assert!(list.push_unranked("y".into()));
        assert!(!list.push_unranked("z".into()));
        assert_eq!(list.take_words(), vec!["x".to_string(), "y".to_string()]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_set_capacity_truncates() {
        let mut list = RankedList::new(3);
        list.insert("a".into(), 3);
        list.insert("b".into(), 2);
        list.insert("c".into(), 1);
        list.set_capacity(1);
        assert_eq!(words(&list), ["a"]);
        assert_eq!(list.capacity(), 1);
    }
}
