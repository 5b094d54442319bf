//! Load the Runyankore/Rukiga-English dictionary text and query it both ways.
//!
//! The source is a loosely formatted, line-oriented text: a lowercase headword,
//! a space, then a free-text English definition that may wrap onto following
//! lines. [`Dictionary::load`] parses it in one pass into two read-only
//! structures:
//!
//! - a [`ForwardIndex`] from normalized headword to its distinct definitions,
//!   kept in first-seen order (homonyms such as `kaga2` are also filed under
//!   `kaga`);
//! - the full entry list in source order, scanned by reverse lookups.
//!
//! # Example
//! ```no_run
//! use rukiga_dict::{Dictionary, FileSource, LoadMode};
//!
//! # fn main() -> Result<(), rukiga_dict::LoadError> {
//! let dict = Dictionary::load(&FileSource::with_mode("rukiga_dictionary.txt", LoadMode::Mmap))?;
//! println!("{}", dict.lookup_forward("omuntu"));
//! for entry in dict.lookup_reverse("mother") {
//!     println!("{}: {}", entry.display_headword(), entry.definition());
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p rukiga-dict --example lookup -- <file> <word>`.

mod index;
mod lookup;
mod parse;
mod source;

use std::io::BufRead;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

pub use index::ForwardIndex;
pub use lookup::{
    ForwardLookup, MAX_REVERSE_RESULTS, MAX_SUGGESTIONS, MIN_KEYWORD_LEN, MIN_WORD_MATCH_LEN,
    NOT_FOUND_MESSAGE, SUGGESTION_DEFINITION_LIMIT, Suggestion,
};
pub use rukiga_types::DictionaryEntry;
pub use source::{DEFAULT_ASSET_NAME, FileSource, LoadMode, StaticSource, TextSource};

use parse::Parser;

/// The dictionary text could not be opened or read.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open dictionary {source_name}: {source}")]
    Open {
        source_name: String,
        source: std::io::Error,
    },
    #[error("failed to read dictionary {source_name} at line {line}: {source}")]
    Read {
        source_name: String,
        line: usize,
        source: std::io::Error,
    },
}

/// Fully parsed dictionary. Never modified after construction.
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    forward: ForwardIndex,
    entries: Vec<DictionaryEntry>,
}

impl Dictionary {
    /// Parse every line of `source`. Nothing is returned unless the whole
    /// text was read successfully.
    pub fn load(source: &dyn TextSource) -> Result<Self, LoadError> {
        let start = Instant::now();
        let name = source.describe();
        let reader = source.open()?;

        let mut parser = Parser::default();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| LoadError::Read {
                source_name: name.clone(),
                line: lineno + 1,
                source,
            })?;
            parser.push_line(&line);
        }

        let dict = Self::from_parser(parser);
        info!(
            "loaded {} entries under {} headwords from {} in {} ms",
            dict.entry_count(),
            dict.headword_count(),
            name,
            start.elapsed().as_millis()
        );
        Ok(dict)
    }

    /// Parse dictionary text already held in memory.
    pub fn from_text(text: &str) -> Self {
        let mut parser = Parser::default();
        for line in text.lines() {
            parser.push_line(line);
        }
        Self::from_parser(parser)
    }

    fn from_parser(parser: Parser) -> Self {
        let (forward, entries, discarded) = parser.finish();
        if discarded > 0 {
            debug!("discarded {discarded} entries with an empty headword or definition");
        }
        Self { forward, entries }
    }

    /// Headword lookup (Runyankore/Rukiga to English).
    ///
    /// Falls back to up to [`MAX_SUGGESTIONS`] prefix matches, taken in the
    /// order headwords first appeared in the source.
    pub fn lookup_forward(&self, query: &str) -> ForwardLookup {
        lookup::forward(&self.forward, query)
    }

    /// Definition search (English to Runyankore/Rukiga).
    ///
    /// Returns at most [`MAX_REVERSE_RESULTS`] entries in source order, one per
    /// display headword. Queries of [`MIN_WORD_MATCH_LEN`] chars or more match
    /// whole words only; shorter ones match any substring. When nothing
    /// matches, each letter run of the query with at least
    /// [`MIN_KEYWORD_LEN`] chars is tried as a plain substring.
    pub fn lookup_reverse(&self, query: &str) -> Vec<&DictionaryEntry> {
        lookup::reverse(&self.entries, query)
    }

    pub fn definitions(&self, headword: &str) -> Option<&[String]> {
        self.forward.get(headword)
    }

    pub fn forward_index(&self) -> &ForwardIndex {
        &self.forward
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    /// Number of distinct lookup keys, base keys of homonyms included.
    pub fn headword_count(&self) -> usize {
        self.forward.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
