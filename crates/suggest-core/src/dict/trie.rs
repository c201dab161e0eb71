use serde::{Deserialize, Serialize};

use super::{DictError, MAX_UNIGRAM_FREQUENCY, MAX_WORD_LENGTH};

/// Index of a node in the trie arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Node {
    pub(crate) ch: char,
    pub(crate) frequency: u8,
    pub(crate) terminal: bool,
    /// Back-link used to rebuild a word; `None` for first-level nodes.
    pub(crate) parent: Option<NodeId>,
    /// At most one child per character, in insertion order.
    pub(crate) children: Vec<NodeId>,
    /// Words observed to follow this node's word.
    pub(crate) bigrams: Vec<NextWord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct NextWord {
    pub(crate) word: NodeId,
    pub(crate) frequency: i32,
}

/// Character trie with per-word frequencies and bigram links.
///
/// Nodes live in a flat arena and refer to each other by [`NodeId`], so the
/// parent back-links never own anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trie {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    /// Byte length of the blob this trie was decoded from.
    #[serde(skip)]
    pub(crate) blob_size: usize,
}

fn accepts(word: &str) -> bool {
    let len = word.chars().count();
    len > 0 && len < MAX_WORD_LENGTH
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    fn child_of(&self, children: &[NodeId], c: char) -> Option<NodeId> {
        children.iter().copied().find(|&id| self.node(id).ch == c)
    }

    fn push_node(&mut self, ch: char, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            ch,
            frequency: 0,
            terminal: false,
            parent,
            children: Vec::new(),
            bigrams: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Walk `word` from the root creating missing nodes; the last node is
    /// marked terminal and returned.
    fn insert_path(&mut self, word: &str) -> Option<NodeId> {
        if !accepts(word) {
            return None;
        }
        let mut parent: Option<NodeId> = None;
        for c in word.chars() {
            let existing = match parent {
                Some(p) => self.child_of(&self.node(p).children, c),
                None => self.child_of(&self.roots, c),
            };
            let next = match existing {
                Some(id) => id,
                None => self.push_node(c, parent),
            };
            parent = Some(next);
        }
        let last = parent?;
        self.nodes[last.index()].terminal = true;
        Some(last)
    }

    /// Insert `word`, keeping the larger of the stored and new frequency.
    /// Empty and over-long words are ignored.
    pub fn add_word(&mut self, word: &str, frequency: i32) {
        let Some(id) = self.insert_path(word) else {
            return;
        };
        let clamped = frequency.clamp(0, MAX_UNIGRAM_FREQUENCY as i32) as u8;
        let node = &mut self.nodes[id.index()];
        node.frequency = node.frequency.max(clamped);
    }

    /// Accumulate `delta` onto the `word1 → word2` bigram, creating it if
    /// needed. Returns the resulting frequency, or `None` if either word
    /// cannot be stored.
    pub fn add_bigram(&mut self, word1: &str, word2: &str, delta: i32) -> Option<i32> {
        self.add_or_set_bigram(word1, word2, delta, true)
    }

    /// Overwrite the `word1 → word2` bigram frequency.
    pub fn set_bigram(&mut self, word1: &str, word2: &str, frequency: i32) -> Option<i32> {
        self.add_or_set_bigram(word1, word2, frequency, false)
    }

    fn add_or_set_bigram(
        &mut self,
        word1: &str,
        word2: &str,
        frequency: i32,
        accumulate: bool,
    ) -> Option<i32> {
        if !accepts(word1) || !accepts(word2) {
            return None;
        }
        // Bigram context must not depend on how the previous word was cased.
        let first = self.insert_path(&word1.to_lowercase())?;
        let second = self.insert_path(word2)?;
        let bigrams = &mut self.nodes[first.index()].bigrams;
        if let Some(next) = bigrams.iter_mut().find(|nw| nw.word == second) {
            next.frequency = if accumulate {
                next.frequency.saturating_add(frequency)
            } else {
                frequency
            };
            return Some(next.frequency);
        }
        bigrams.push(NextWord {
            word: second,
            frequency,
        });
        Some(frequency)
    }

    /// Exact lookup of a terminal node.
    pub fn find(&self, word: &str) -> Option<NodeId> {
        if word.is_empty() {
            return None;
        }
        let mut children = self.roots.as_slice();
        let mut found = None;
        for c in word.chars() {
            let id = self.child_of(children, c)?;
            children = &self.node(id).children;
            found = Some(id);
        }
        found.filter(|&id| self.node(id).terminal)
    }

    /// Stored frequency of `word`, `None` if it is not a complete word.
    pub fn word_frequency(&self, word: &str) -> Option<u8> {
        self.find(word).map(|id| self.node(id).frequency)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.find(word).is_some()
    }

    /// Frequency of the `word1 → word2` bigram, if recorded.
    pub fn bigram_frequency(&self, word1: &str, word2: &str) -> Option<i32> {
        let first = self.find(word1)?;
        let second = self.find(word2)?;
        self.node(first)
            .bigrams
            .iter()
            .find(|nw| nw.word == second)
            .map(|nw| nw.frequency)
    }

    /// Rebuild the word ending at `id` by following parent links.
    pub fn word_at(&self, id: NodeId) -> String {
        let mut chars = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current);
            chars.push(node.ch);
            cursor = node.parent;
        }
        chars.iter().rev().collect()
    }

    /// All stored words with their frequencies, depth-first.
    pub fn words(&self) -> Vec<(String, u8)> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.terminal {
                out.push((self.word_at(id), node.frequency));
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// All bigrams as `(word1, word2, frequency)`.
    pub fn bigrams(&self) -> Vec<(String, String, i32)> {
        let mut out = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.bigrams.is_empty() {
                continue;
            }
            let first = self.word_at(NodeId(index as u32));
            for next in &node.bigrams {
                out.push((first.clone(), self.word_at(next.word), next.frequency));
            }
        }
        out
    }

    pub fn word_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.terminal).count()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Byte size of the blob this trie was loaded from (0 if built in memory).
    pub fn size(&self) -> usize {
        self.blob_size
    }

    /// Every link must stay inside the arena, and a parent always precedes
    /// its children (nodes are only ever appended). Run on decoded blobs.
    pub(crate) fn check_links(&self) -> Result<(), DictError> {
        let len = self.nodes.len();
        if let Some(root) = self.roots.iter().find(|r| r.index() >= len) {
            return Err(DictError::InvalidNodeLink { node: root.index() });
        }
        for (i, node) in self.nodes.iter().enumerate() {
            let bad = node.parent.is_some_and(|p| p.index() >= i)
                || node.children.iter().any(|c| c.index() <= i || c.index() >= len)
                || node.bigrams.iter().any(|b| b.word.index() >= len);
            if bad {
                return Err(DictError::InvalidNodeLink { node: i });
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.blob_size = 0;
    }
}
