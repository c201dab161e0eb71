use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process;

use keysuggest::dict::{source, Trie};
use keysuggest::learning::{FileBigramStore, FileWordStore};

pub fn compile(words_file: &str, bigrams_file: Option<&str>, output_file: &str) {
    eprintln!("Reading {words_file}...");
    let trie = die!(
        source::load_files(Path::new(words_file), bigrams_file.map(Path::new)),
        "Error reading word list: {}"
    );

    eprintln!(
        "Built trie: {} words, {} nodes, {} bigrams",
        trie.word_count(),
        trie.node_count(),
        trie.bigrams().len()
    );

    die!(
        trie.save(Path::new(output_file)),
        "Error writing dictionary: {}"
    );

    let file_size = fs::metadata(output_file).map(|m| m.len()).unwrap_or(0);
    eprintln!(
        "Wrote {output_file} ({:.1} KB)",
        file_size as f64 / 1024.0
    );
}

pub fn info(file: &str) {
    let magic = fs::read(file)
        .ok()
        .and_then(|b| b.get(..4).map(|s| s.to_vec()));

    match magic.as_deref() {
        Some(b"KSDX") => info_dict(file),
        Some(b"KSWD") => info_words(file),
        Some(b"KSBG") => info_bigrams(file),
        Some(other) => {
            eprintln!(
                "Unknown file format (magic: {:?})",
                String::from_utf8_lossy(other)
            );
            process::exit(1);
        }
        None => {
            eprintln!("Error reading file: {file}");
            process::exit(1);
        }
    }
}

fn info_dict(dict_file: &str) {
    let trie = die!(
        Trie::open(Path::new(dict_file)),
        "Error opening dictionary: {}"
    );

    println!("Dictionary: {dict_file}");
    println!("File size:  {:.1} KB", trie.size() as f64 / 1024.0);
    println!("Words:      {}", trie.word_count());
    println!("Nodes:      {}", trie.node_count());
    println!("Bigrams:    {}", trie.bigrams().len());

    let mut words = trie.words();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    println!();
    println!("Most frequent:");
    for (word, freq) in words.iter().take(10) {
        println!("  {word}\t{freq}");
    }
}

fn print_locale_counts<'a>(locales: impl Iterator<Item = &'a str>) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for locale in locales {
        *counts.entry(locale).or_default() += 1;
    }
    for (locale, count) in counts {
        println!("  {locale}\t{count}");
    }
}

fn info_words(file: &str) {
    let store = die!(FileWordStore::open(file), "Error opening word table: {}");
    let rows = store.rows();
    println!("Learned words: {file}");
    println!("Rows:       {}", rows.len());
    print_locale_counts(rows.iter().map(|r| r.locale.as_str()));
}

fn info_bigrams(file: &str) {
    let store = die!(FileBigramStore::open(file), "Error opening bigram table: {}");
    let rows = store.rows();
    println!("User bigrams: {file}");
    println!("Rows:       {}", rows.len());
    print_locale_counts(rows.iter().map(|r| r.locale.as_str()));
}

pub fn lookup(dict_file: &str, word: &str) {
    let trie = die!(
        Trie::open(Path::new(dict_file)),
        "Error opening dictionary: {}"
    );
    match trie.word_frequency(word) {
        Some(freq) => println!("{word}\t{freq}"),
        None => println!("{word} → (not found)"),
    }
    let lower = word.to_lowercase();
    let followers: Vec<_> = trie
        .bigrams()
        .into_iter()
        .filter(|(first, _, _)| *first == lower)
        .collect();
    for (_, next, freq) in followers {
        println!("  → {next}\t{freq}");
    }
}
