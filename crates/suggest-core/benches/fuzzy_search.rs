use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use suggest_core::composer::Composer;
use suggest_core::dict::{DataType, DictType, Trie, TrieStore};
use suggest_core::suggest::Suggest;

const SEED_WORDS: &[(&str, i32)] = &[
    ("the", 255),
    ("there", 200),
    ("then", 190),
    ("they", 210),
    ("this", 220),
    ("that", 230),
    ("these", 160),
    ("those", 150),
    ("through", 140),
    ("thought", 130),
    ("hello", 150),
    ("help", 170),
    ("helpful", 110),
    ("keyboard", 90),
    ("keystroke", 60),
    ("suggestion", 80),
    ("suggest", 100),
    ("morning", 120),
    ("more", 200),
    ("mother", 140),
    ("night", 130),
    ("nice", 150),
    ("don't", 180),
    ("café", 70),
    ("because", 190),
    ("between", 160),
    ("beautiful", 120),
    ("question", 110),
    ("quick", 130),
    ("quiet", 100),
];

/// Seed words plus generated suffixed forms, so the walk sees a trie of
/// realistic fan-out.
fn bench_trie() -> Trie {
    let mut trie = Trie::new();
    for &(word, freq) in SEED_WORDS {
        trie.add_word(word, freq);
        for (i, suffix) in ["s", "ed", "ing", "er", "ly", "ness"].iter().enumerate() {
            trie.add_word(&format!("{word}{suffix}"), freq / (i as i32 + 2));
        }
    }
    trie.add_bigram("good", "morning", 40);
    trie.add_bigram("good", "night", 30);
    trie
}

/// Keystrokes with the QWERTY row neighbours as alternates.
fn noisy(word: &str) -> Composer {
    const ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];
    let mut composer = Composer::new();
    for c in word.chars() {
        let mut codes = vec![c];
        if let Some(row) = ROWS.iter().find(|r| r.contains(c)) {
            let keys: Vec<char> = row.chars().collect();
            if let Some(pos) = keys.iter().position(|&k| k == c) {
                if pos > 0 {
                    codes.push(keys[pos - 1]);
                }
                if pos + 1 < keys.len() {
                    codes.push(keys[pos + 1]);
                }
            }
        }
        composer.add(c, &codes);
    }
    composer
}

static INPUTS: &[(&str, &str)] = &[
    ("short", "th"),
    ("medium", "helo"),
    ("long", "beautifull"),
];

fn bench_walk(c: &mut Criterion) {
    let store = TrieStore::with_trie(DictType::Main, bench_trie());
    let mut group = c.benchmark_group("fuzzy/walk");
    for &(label, word) in INPUTS {
        let composer = noisy(word);
        group.bench_with_input(BenchmarkId::new(label, word.len()), &composer, |b, composer| {
            b.iter(|| {
                let mut found = 0usize;
                let mut count = |_: &[char], _: i64, _: DictType, _: DataType| {
                    found += 1;
                    true
                };
                store.get_words(composer, &mut count, None);
                found
            });
        });
    }
    group.finish();
}

fn bench_suggestions(c: &mut Criterion) {
    let mut suggest = Suggest::new(TrieStore::with_trie(DictType::Main, bench_trie()));
    let mut group = c.benchmark_group("fuzzy/suggestions");
    for &(label, word) in INPUTS {
        let composer = noisy(word);
        group.bench_with_input(BenchmarkId::new(label, word.len()), &composer, |b, composer| {
            b.iter(|| suggest.get_suggestions(composer, false, Some("good")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_walk, bench_suggestions);
criterion_main!(benches);
