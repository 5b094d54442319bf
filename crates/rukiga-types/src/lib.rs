//! Shared types for the Runyankore/Rukiga-English dictionary.
//!
//! Holds the [`DictionaryEntry`] record produced by the loader, the
//! [`Language`]/[`Direction`] pair used to route a query to the right lookup,
//! and the pure text helpers that turn raw dictionary text into lookup keys.
//! Both the loader and the lookup side call [`normalize_headword`], so a
//! headword always maps to the same key no matter where it came from.
//!
//! ```rust
//! use rukiga_types::{Direction, Language, normalize_headword, strip_sense_marker};
//!
//! assert_eq!(normalize_headword("  Kaga2 "), "kaga2");
//! assert_eq!(strip_sense_marker("kaga2"), "kaga");
//!
//! let from = Language::from_name("english").unwrap();
//! let to = Language::from_name("rukiga").unwrap();
//! assert_eq!(Direction::between(from, to), Some(Direction::EnglishToRukiga));
//! ```

use std::fmt;

/// Alternate apostrophe glyph (U+02BC) used throughout the source text.
pub const MODIFIER_APOSTROPHE: char = '\u{02BC}';

/// One sense of one headword, as it appeared in the source text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DictionaryEntry {
    display_headword: String,
    definition: String,
    definition_lower: String,
}

impl DictionaryEntry {
    /// Build an entry from an already-cleaned definition.
    pub fn new(display_headword: impl Into<String>, definition: impl Into<String>) -> Self {
        let definition = definition.into();
        let definition_lower = definition.to_lowercase();
        Self {
            display_headword: display_headword.into(),
            definition,
            definition_lower,
        }
    }

    /// Headword in its original case.
    pub fn display_headword(&self) -> &str {
        &self.display_headword
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Lowercase copy of the definition, computed once at construction.
    pub fn definition_lower(&self) -> &str {
        &self.definition_lower
    }
}

/// Languages a caller may name when asking for a translation.
///
/// Only English and Runyankore/Rukiga are served by the dictionary; the rest
/// are recognised so callers can tell "unsupported" apart from "unknown".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Language {
    English,
    Rukiga,
    French,
    Arabic,
    Swahili,
    Korean,
}

impl Language {
    /// Parse a language name or code, ignoring case and surrounding whitespace.
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "rukiga" | "runyankore" | "runyakole" | "runyankore-rukiga" | "runyakole/rukiga"
            | "nyn" | "cgg" => Some(Language::Rukiga),
            "fr" | "french" => Some(Language::French),
            "ar" | "arabic" => Some(Language::Arabic),
            "sw" | "swahili" => Some(Language::Swahili),
            "ko" | "korean" => Some(Language::Korean),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::English => "English",
            Language::Rukiga => "Runyankore/Rukiga",
            Language::French => "French",
            Language::Arabic => "Arabic",
            Language::Swahili => "Swahili",
            Language::Korean => "Korean",
        })
    }
}

/// Which way a query goes through the dictionary.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Headword lookup: Runyankore/Rukiga word to English definitions.
    RukigaToEnglish,
    /// Definition search: English text to Runyankore/Rukiga headwords.
    EnglishToRukiga,
}

impl Direction {
    /// The direction served for a language pair, or `None` when the
    /// dictionary cannot translate between them.
    pub fn between(from: Language, to: Language) -> Option<Self> {
        match (from, to) {
            (Language::Rukiga, Language::English) => Some(Direction::RukigaToEnglish),
            (Language::English, Language::Rukiga) => Some(Direction::EnglishToRukiga),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::RukigaToEnglish => "rukiga-to-english",
            Direction::EnglishToRukiga => "english-to-rukiga",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical lookup key for a headword.
///
/// Lowercases, maps the modifier apostrophe to `'`, drops everything except
/// ASCII letters, digits, `'`, `-` and whitespace, then collapses whitespace.
pub fn normalize_headword(raw: &str) -> String {
    let mut filtered = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        let c = if c == MODIFIER_APOSTROPHE { '\'' } else { c };
        if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '\'' | '-') {
            filtered.push(c);
        } else if is_space(c) {
            filtered.push(' ');
        }
    }
    collapse_whitespace(&filtered)
}

/// Definition text with the modifier apostrophe normalized and whitespace
/// collapsed. Case is preserved.
pub fn clean_definition(raw: &str) -> String {
    collapse_whitespace(&raw.replace(MODIFIER_APOSTROPHE, "'"))
}

/// Replace every run of ASCII spaces, tabs, vertical tabs, form feeds and
/// line breaks with a single space, then [`trim_blank`]. Other Unicode
/// spacing such as U+00A0 is kept as text.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(is_space).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    trim_blank(&out).to_string()
}

/// Strip leading and trailing ASCII control characters and spaces.
pub fn trim_blank(text: &str) -> &str {
    text.trim_matches(|c: char| c <= ' ')
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Strip a trailing homonym number (`kaga2` -> `kaga`).
pub fn strip_sense_marker(key: &str) -> &str {
    key.trim_end_matches(|c: char| c.is_ascii_digit())
}
