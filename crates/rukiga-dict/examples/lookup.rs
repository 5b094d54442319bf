use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rukiga_dict::{Dictionary, FileSource, LoadMode};

const USAGE: &str =
    "usage: cargo run -p rukiga-dict --example lookup -- <dictionary.txt> [--english] <query>";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let path = args.next().map(PathBuf::from).context(USAGE)?;
    let mut english = false;
    let mut words = Vec::new();
    for arg in args {
        if arg == "--english" {
            english = true;
        } else {
            words.push(arg);
        }
    }
    if words.is_empty() {
        bail!(USAGE);
    }
    let query = words.join(" ");

    let dict = Dictionary::load(&FileSource::with_mode(&path, LoadMode::Owned))
        .with_context(|| format!("loading dictionary from {}", path.display()))?;

    if english {
        let matches = dict.lookup_reverse(&query);
        if matches.is_empty() {
            println!("{}", rukiga_dict::NOT_FOUND_MESSAGE);
        }
        for entry in matches {
            println!("{:<16} {}", entry.display_headword(), entry.definition());
        }
    } else {
        println!("{}", dict.lookup_forward(&query));
    }

    Ok(())
}
