use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rukiga_dict::{Dictionary, FileSource, LoadMode};

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p rukiga-dict --example stats -- <path-to-dictionary.txt>")?;

    let dict = Dictionary::load(&FileSource::with_mode(&path, LoadMode::Mmap))
        .with_context(|| format!("loading dictionary from {}", path.display()))?;

    let homonym_keys = dict
        .forward_index()
        .iter()
        .filter(|(key, _)| key.ends_with(|c: char| c.is_ascii_digit()))
        .count();
    let multi_sense_keys = dict
        .forward_index()
        .iter()
        .filter(|(_, defs)| defs.len() > 1)
        .count();
    let longest = dict
        .entries()
        .iter()
        .max_by_key(|e| e.definition().len());

    println!("Dictionary   : {}", path.display());
    println!("Entries      : {}", dict.entry_count());
    println!("Lookup keys  : {}", dict.headword_count());
    println!("Numbered keys: {}", homonym_keys);
    println!("Keys with several definitions: {}", multi_sense_keys);
    if let Some(entry) = longest {
        println!(
            "Longest definition: {} ({} bytes)",
            entry.display_headword(),
            entry.definition().len()
        );
    }

    // Spot-check a couple of common words in each direction.
    for word in ["omuntu", "nyina"] {
        println!("'{}' found? {}", word, dict.lookup_forward(word).is_found());
    }
    for word in ["mother", "water"] {
        println!("'{}' -> {} headwords", word, dict.lookup_reverse(word).len());
    }

    Ok(())
}
