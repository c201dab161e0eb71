//! Plain-text word and bigram lists.
//!
//! Word lists hold `word<TAB>frequency` per line, bigram lists
//! `word1<TAB>word2<TAB>frequency`. Blank lines and `#` comments are skipped.

use std::fs;
use std::path::Path;

use super::{DictError, Trie};

fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
}

fn parse_frequency(line: usize, raw: &str) -> Result<i32, DictError> {
    raw.trim().parse().map_err(|_| DictError::Parse {
        line,
        reason: format!("invalid frequency {raw:?}"),
    })
}

/// Parse a word list into `(word, frequency)` pairs.
pub fn parse_word_list(text: &str) -> Result<Vec<(String, i32)>, DictError> {
    data_lines(text)
        .map(|(line, content)| {
            let mut fields = content.split('\t');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(word), Some(freq), None) if !word.is_empty() => {
                    Ok((word.to_string(), parse_frequency(line, freq)?))
                }
                _ => Err(DictError::Parse {
                    line,
                    reason: "expected word<TAB>frequency".to_string(),
                }),
            }
        })
        .collect()
}

/// Parse a bigram list into `(word1, word2, frequency)` triples.
pub fn parse_bigram_list(text: &str) -> Result<Vec<(String, String, i32)>, DictError> {
    data_lines(text)
        .map(|(line, content)| {
            let fields: Vec<&str> = content.split('\t').collect();
            match fields.as_slice() {
                [w1, w2, freq] if !w1.is_empty() && !w2.is_empty() => {
                    Ok((w1.to_string(), w2.to_string(), parse_frequency(line, freq)?))
                }
                _ => Err(DictError::Parse {
                    line,
                    reason: "expected word1<TAB>word2<TAB>frequency".to_string(),
                }),
            }
        })
        .collect()
}

/// Build a trie from word-list text and optional bigram-list text.
pub fn build_trie(words: &str, bigrams: Option<&str>) -> Result<Trie, DictError> {
    let mut trie = Trie::new();
    for (word, freq) in parse_word_list(words)? {
        trie.add_word(&word, freq);
    }
    if let Some(text) = bigrams {
        for (w1, w2, freq) in parse_bigram_list(text)? {
            trie.set_bigram(&w1, &w2, freq);
        }
    }
    Ok(trie)
}

/// Read word-list (and bigram-list) files into a trie.
pub fn load_files(words: &Path, bigrams: Option<&Path>) -> Result<Trie, DictError> {
    let word_text = fs::read_to_string(words)?;
    let bigram_text = bigrams.map(fs::read_to_string).transpose()?;
    build_trie(&word_text, bigram_text.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word_list() {
        let text = "# comment\nthe\t200\n\nthere\t150\r\n";
        let words = parse_word_list(text).unwrap();
        assert_eq!(
            words,
            vec![("the".to_string(), 200), ("there".to_string(), 150)]
        );
    }

    #[test]
    fn test_parse_word_list_bad_frequency() {
        let err = parse_word_list("the\t200\nthen\tmany\n").unwrap_err();
        assert!(matches!(err, DictError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_parse_word_list_missing_field() {
        let err = parse_word_list("lonely\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_bigram_list() {
        let bigrams = parse_bigram_list("good\tmorning\t40\n").unwrap();
        assert_eq!(
            bigrams,
            vec![("good".to_string(), "morning".to_string(), 40)]
        );
        assert!(parse_bigram_list("good\tmorning\n").is_err());
    }

    #[test]
    fn test_build_trie() {
        let trie = build_trie("good\t100\nmorning\t90\n", Some("good\tmorning\t40\n")).unwrap();
        assert_eq!(trie.word_frequency("good"), Some(100));
        assert_eq!(trie.bigram_frequency("good", "morning"), Some(40));
    }
}
