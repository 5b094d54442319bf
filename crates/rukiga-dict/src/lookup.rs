use std::collections::HashSet;
use std::fmt;

use rukiga_types::{DictionaryEntry, normalize_headword, trim_blank};

use crate::index::ForwardIndex;

pub const MAX_SUGGESTIONS: usize = 3;
pub const MAX_REVERSE_RESULTS: usize = 5;
pub const SUGGESTION_DEFINITION_LIMIT: usize = 220;
/// Queries at least this long must match on word boundaries.
pub const MIN_WORD_MATCH_LEN: usize = 3;
pub const MIN_KEYWORD_LEN: usize = 3;

pub const NOT_FOUND_MESSAGE: &str = "Translation not found";
const SUGGESTION_HEADER: &str = "Did you mean:";
const ELLIPSIS: &str = "...";

/// Outcome of a headword lookup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ForwardLookup {
    /// The query was blank.
    Empty,
    /// Every definition stored under the exact key.
    Definitions(Vec<String>),
    /// Headwords starting with the query, when there was no exact key.
    Suggestions(Vec<Suggestion>),
    NotFound,
}

impl ForwardLookup {
    pub fn is_found(&self) -> bool {
        matches!(
            self,
            ForwardLookup::Definitions(_) | ForwardLookup::Suggestions(_)
        )
    }
}

impl fmt::Display for ForwardLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardLookup::Empty => Ok(()),
            ForwardLookup::Definitions(defs) => f.write_str(&defs.join("\n\n")),
            ForwardLookup::Suggestions(suggestions) => {
                writeln!(f, "{SUGGESTION_HEADER}")?;
                for (i, suggestion) in suggestions.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n\n")?;
                    }
                    write!(f, "{suggestion}")?;
                }
                Ok(())
            }
            ForwardLookup::NotFound => f.write_str(NOT_FOUND_MESSAGE),
        }
    }
}

/// A "did you mean" candidate: key plus its first definition, shortened.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Suggestion {
    pub headword: String,
    pub definition: String,
}

impl Suggestion {
    fn new(headword: &str, definition: &str) -> Self {
        Self {
            headword: headword.to_string(),
            definition: truncate_definition(definition),
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \u{2014} {}", self.headword, self.definition)
    }
}

pub(crate) fn forward(index: &ForwardIndex, query: &str) -> ForwardLookup {
    if trim_blank(query).is_empty() {
        return ForwardLookup::Empty;
    }

    let key = normalize_headword(query);
    if key.is_empty() {
        return ForwardLookup::NotFound;
    }

    if let Some(defs) = index.get(&key)
        && !defs.is_empty()
    {
        return ForwardLookup::Definitions(defs.to_vec());
    }

    let suggestions: Vec<Suggestion> = index
        .iter()
        .filter(|(candidate, _)| candidate.starts_with(key.as_str()))
        .filter_map(|(candidate, defs)| defs.first().map(|d| Suggestion::new(candidate, d)))
        .take(MAX_SUGGESTIONS)
        .collect();

    if suggestions.is_empty() {
        ForwardLookup::NotFound
    } else {
        ForwardLookup::Suggestions(suggestions)
    }
}

pub(crate) fn reverse<'a>(entries: &'a [DictionaryEntry], query: &str) -> Vec<&'a DictionaryEntry> {
    let search = trim_blank(query).to_lowercase();
    if search.is_empty() {
        return Vec::new();
    }

    let whole_word = search.chars().count() >= MIN_WORD_MATCH_LEN;
    let matches = collect_distinct(entries, |definition| {
        if whole_word {
            contains_whole_word(definition, &search)
        } else {
            definition.contains(search.as_str())
        }
    });
    if !matches.is_empty() {
        return matches;
    }

    let keywords = keywords(&search);
    if keywords.is_empty() {
        return matches;
    }
    collect_distinct(entries, |definition| {
        keywords.iter().any(|k| definition.contains(k))
    })
}

/// Scan in source order, keeping the first entry per display headword.
fn collect_distinct<'a, F>(entries: &'a [DictionaryEntry], matches: F) -> Vec<&'a DictionaryEntry>
where
    F: Fn(&str) -> bool,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(MAX_REVERSE_RESULTS);
    for entry in entries {
        if seen.contains(entry.display_headword()) || !matches(entry.definition_lower()) {
            continue;
        }
        seen.insert(entry.display_headword());
        out.push(entry);
        if out.len() >= MAX_REVERSE_RESULTS {
            break;
        }
    }
    out
}

/// True when `needle` occurs in `haystack` with no letter or digit directly
/// on either side.
pub(crate) fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        if !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        {
            return true;
        }
        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Letter runs of the query long enough to be worth a substring search.
fn keywords(search: &str) -> Vec<&str> {
    search
        .split(|c: char| !c.is_alphabetic())
        .filter(|token| token.chars().count() >= MIN_KEYWORD_LEN)
        .collect()
}

fn truncate_definition(definition: &str) -> String {
    let trimmed = trim_blank(definition);
    if trimmed.chars().count() <= SUGGESTION_DEFINITION_LIMIT {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed
        .chars()
        .take(SUGGESTION_DEFINITION_LIMIT - ELLIPSIS.len())
        .collect();
    cut.push_str(ELLIPSIS);
    cut
}
