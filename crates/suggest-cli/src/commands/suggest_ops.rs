use std::path::Path;

use keysuggest::api::{EngineResources, SuggestEngine};
use keysuggest::composer::Composer;
use keysuggest::dict::{DictType, Trie, TrieStore};
use keysuggest::suggest::CorrectionMode;

const QWERTY_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Horizontal neighbours of `c` on a QWERTY layout, the key itself first.
pub fn qwerty_neighbours(c: char) -> Vec<char> {
    let mut codes = vec![c];
    let lower = c.to_ascii_lowercase();
    for row in QWERTY_ROWS {
        let keys: Vec<char> = row.chars().collect();
        if let Some(pos) = keys.iter().position(|&k| k == lower) {
            if pos > 0 {
                codes.push(keys[pos - 1]);
            }
            if pos + 1 < keys.len() {
                codes.push(keys[pos + 1]);
            }
        }
    }
    codes
}

/// Composer for `input`, optionally with QWERTY neighbours as alternates.
pub fn compose(input: &str, proximity: bool) -> Composer {
    if !proximity {
        return Composer::from_typed(input);
    }
    let mut composer = Composer::new();
    for c in input.chars() {
        composer.add(c, &qwerty_neighbours(c));
    }
    composer
}

pub struct SuggestOptions<'a> {
    pub previous: Option<&'a str>,
    pub max: Option<usize>,
    pub mode: Option<CorrectionMode>,
    pub proximity: bool,
    pub json: bool,
}

pub fn suggest_cmd(dict_file: &str, input: &str, opts: &SuggestOptions<'_>) {
    let trie = die!(
        Trie::open(Path::new(dict_file)),
        "Error opening dictionary: {}"
    );
    let main = TrieStore::with_trie(DictType::Main, trie);
    let engine = die!(
        SuggestEngine::new(EngineResources::in_memory("cli", main)),
        "Error starting engine: {}"
    );
    if let Some(mode) = opts.mode {
        engine.set_correction_mode(mode);
    }
    if let Some(max) = opts.max {
        die!(engine.set_max_suggestions(max), "Error: {}");
    }

    let composer = compose(input, opts.proximity);
    let response = engine.suggestions(&composer, opts.previous);

    if opts.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).expect("JSON serialization failed")
        );
        return;
    }
    for (i, word) in response.words.iter().enumerate() {
        let marker = if i == 1 && response.has_correction {
            "*"
        } else {
            " "
        };
        println!("{marker}{i:>3}  {word}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbours() {
        assert_eq!(qwerty_neighbours('q'), vec!['q', 'w']);
        assert_eq!(qwerty_neighbours('g'), vec!['g', 'f', 'h']);
        assert_eq!(qwerty_neighbours('M'), vec!['M', 'n']);
        assert_eq!(qwerty_neighbours('\''), vec!['\'']);
    }

    #[test]
    fn test_compose() {
        let plain = compose("Hi", false);
        assert_eq!(plain.size(), 2);
        assert_eq!(plain.codes_at(0), &['h']);

        let noisy = compose("hi", true);
        assert_eq!(noisy.typed_word(), Some("hi"));
        assert_eq!(noisy.codes_at(1), &['i', 'u', 'o']);
    }
}
