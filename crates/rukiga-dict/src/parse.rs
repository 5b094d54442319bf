use rukiga_types::{
    DictionaryEntry, MODIFIER_APOSTROPHE, clean_definition, collapse_whitespace,
    normalize_headword, strip_sense_marker, trim_blank,
};

use crate::index::ForwardIndex;

/// Single forward pass over dictionary lines.
///
/// A line opens a new entry when it starts with a lowercase letter, contains
/// a space, and its first token looks like a headword. Any other non-blank
/// line continues the pending definition.
#[derive(Default)]
pub(crate) struct Parser {
    forward: ForwardIndex,
    entries: Vec<DictionaryEntry>,
    pending: Option<Pending>,
    discarded: usize,
}

struct Pending {
    headword: String,
    definition: String,
}

impl Parser {
    pub(crate) fn push_line(&mut self, line: &str) {
        let trimmed = trim_blank(line);
        if trimmed.is_empty() {
            return;
        }

        if looks_like_headword(trimmed) {
            self.flush();
            let (headword, definition) = split_headword_line(trimmed);
            self.pending = Some(Pending {
                headword,
                definition,
            });
        } else if let Some(pending) = self.pending.as_mut() {
            if !pending.definition.is_empty() {
                pending.definition.push(' ');
            }
            pending.definition.push_str(trimmed);
        }
    }

    /// Finalize the last entry and hand back the built structures along with
    /// the number of entries dropped for having an empty field.
    pub(crate) fn finish(mut self) -> (ForwardIndex, Vec<DictionaryEntry>, usize) {
        self.flush();
        (self.forward, self.entries, self.discarded)
    }

    fn flush(&mut self) {
        if let Some(Pending {
            headword,
            definition,
        }) = self.pending.take()
            && !definition.is_empty()
        {
            self.store_entry(&headword, &definition);
        }
    }

    fn store_entry(&mut self, raw_headword: &str, raw_definition: &str) {
        let key = normalize_headword(raw_headword);
        let definition = clean_definition(raw_definition);
        if key.is_empty() || definition.is_empty() {
            self.discarded += 1;
            return;
        }

        self.forward.insert(&key, &definition);
        let base = strip_sense_marker(&key);
        if !base.is_empty() && base != key {
            self.forward.insert(base, &definition);
        }

        self.entries
            .push(DictionaryEntry::new(trim_blank(raw_headword), definition));
    }
}

pub(crate) fn looks_like_headword(line: &str) -> bool {
    let Some(first) = line.chars().next() else {
        return false;
    };
    if !first.is_lowercase() {
        return false;
    }
    match line.find(' ') {
        Some(space) if space > 0 => is_headword_token(&line[..space]),
        _ => false,
    }
}

/// Letters, apostrophes and hyphens, optionally followed by a sense number.
fn is_headword_token(token: &str) -> bool {
    let body = strip_sense_marker(token);
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_lowercase() || matches!(c, '\'' | '-' | MODIFIER_APOSTROPHE))
}

fn split_headword_line(line: &str) -> (String, String) {
    let sanitized = collapse_whitespace(&line.replace('|', " "));
    match sanitized.split_once(' ') {
        Some((headword, definition)) => (headword.to_string(), trim_blank(definition).to_string()),
        None => (sanitized, String::new()),
    }
}
