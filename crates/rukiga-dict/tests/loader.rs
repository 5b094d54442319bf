use std::io::Write;
use std::path::PathBuf;

use rukiga_dict::{
    Dictionary, DictionaryEntry, FileSource, ForwardLookup, LoadError, LoadMode,
    MAX_REVERSE_RESULTS, StaticSource,
};
use tempfile::NamedTempFile;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("rukiga_sample.txt")
}

fn load_fixture() -> Dictionary {
    Dictionary::load(&FileSource::new(fixture_path())).expect("load fixture")
}

fn headwords(entries: &[&DictionaryEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.display_headword().to_string())
        .collect()
}

#[test]
fn loads_fixture_in_both_modes() {
    let mmap = Dictionary::load(&FileSource::with_mode(fixture_path(), LoadMode::Mmap))
        .expect("mmap load");
    let owned = Dictionary::load(&FileSource::with_mode(fixture_path(), LoadMode::Owned))
        .expect("owned load");
    assert_eq!(mmap.entry_count(), 15);
    assert_eq!(mmap.entry_count(), owned.entry_count());
    assert_eq!(mmap.headword_count(), owned.headword_count());
}

#[test]
fn continuation_lines_extend_the_definition() {
    let dict = load_fixture();
    assert_eq!(
        dict.lookup_forward("nyina").to_string(),
        "mother (used for one's own mother)"
    );
    assert_eq!(
        dict.definitions("ekyangu").unwrap(),
        &["something light, easy; a category of things (not heavy), e.g. feathers".to_string()]
    );
    assert_eq!(
        dict.definitions("okuzaana2").unwrap(),
        &["to play a game Omuhanda road (capitalised, so never a headword)".to_string()]
    );
}

#[test]
fn forward_lookup_normalizes_the_query() {
    let dict = load_fixture();
    assert_eq!(
        dict.lookup_forward("  KYʼOMUKA ").to_string(),
        "of the home, domestic"
    );
    assert_eq!(
        dict.lookup_forward("ky'omuka").to_string(),
        "of the home, domestic"
    );
    assert_eq!(
        dict.lookup_forward("Ente"),
        ForwardLookup::Definitions(vec!["cow; cattle".into(), "a cow (female)".into()])
    );
}

#[test]
fn homonyms_are_joined_under_the_base_headword() {
    let dict = load_fixture();
    assert_eq!(dict.lookup_forward("kaga2").to_string(), "a walking stick");
    assert_eq!(
        dict.lookup_forward("kaga").to_string(),
        "a small bird\n\na walking stick"
    );
}

#[test]
fn prefix_query_suggests_headwords_in_source_order() {
    let dict = load_fixture();
    let result = dict.lookup_forward("om");
    assert!(result.is_found());
    let text = result.to_string();
    assert!(text.starts_with("Did you mean:\n"));
    assert!(text.contains("omu \u{2014} in, inside"));
    assert_eq!(
        text,
        "Did you mean:\nomu \u{2014} in, inside\n\nomuntu \u{2014} person, human being"
    );

    let ka = dict.lookup_forward("ka");
    let ForwardLookup::Suggestions(suggestions) = ka else {
        panic!("expected suggestions, got {ka:?}");
    };
    let keys: Vec<&str> = suggestions.iter().map(|s| s.headword.as_str()).collect();
    assert_eq!(keys, vec!["kaga1", "kaga", "kaga2"]);
}

#[test]
fn forward_lookup_edge_cases() {
    let dict = load_fixture();
    assert_eq!(dict.lookup_forward("   "), ForwardLookup::Empty);
    assert_eq!(dict.lookup_forward("   ").to_string(), "");
    assert_eq!(dict.lookup_forward("!!!"), ForwardLookup::NotFound);
    assert_eq!(
        dict.lookup_forward("zzz").to_string(),
        "Translation not found"
    );
}

#[test]
fn every_stored_definition_is_reachable_by_its_headword() {
    let dict = load_fixture();
    for entry in dict.entries() {
        let text = dict.lookup_forward(entry.display_headword()).to_string();
        assert!(
            text.contains(entry.definition()),
            "{} -> {text}",
            entry.display_headword()
        );
    }
}

#[test]
fn reverse_lookup_matches_whole_words_for_longer_queries() {
    let dict = load_fixture();
    assert_eq!(headwords(&dict.lookup_reverse("cat")), vec!["enjangu"]);
    assert_eq!(headwords(&dict.lookup_reverse("Mother")), vec!["nyina"]);
}

#[test]
fn reverse_lookup_uses_substrings_for_short_queries() {
    let dict = load_fixture();
    assert_eq!(headwords(&dict.lookup_reverse("ox")), vec!["ekisanduku"]);
}

#[test]
fn reverse_lookup_is_distinct_and_capped() {
    let dict = load_fixture();
    assert_eq!(headwords(&dict.lookup_reverse("cow")), vec!["ente"]);

    let many = dict.lookup_reverse("a");
    assert_eq!(many.len(), MAX_REVERSE_RESULTS);
    let names = headwords(&many);
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), names.len());
    assert_eq!(names[0], "omuntu");
}

#[test]
fn reverse_lookup_falls_back_to_keywords() {
    let dict = load_fixture();
    assert_eq!(
        headwords(&dict.lookup_reverse("walking sticks")),
        vec!["kaga2", "kaga3"]
    );
    assert!(dict.lookup_reverse("xylophone").is_empty());
    assert!(dict.lookup_reverse("  ").is_empty());
}

#[test]
fn empty_source_loads_an_empty_dictionary() {
    let file = NamedTempFile::new().expect("temp file");
    let dict = Dictionary::load(&FileSource::new(file.path())).expect("empty file loads");
    assert!(dict.is_empty());
    assert_eq!(dict.headword_count(), 0);
    assert_eq!(dict.lookup_forward("omu"), ForwardLookup::NotFound);
    assert!(dict.lookup_reverse("mother").is_empty());
}

#[test]
fn static_source_matches_from_text() {
    let text = "omu  in, inside\nnyina  mother\n";
    let loaded = Dictionary::load(&StaticSource::new("inline", text)).expect("static load");
    let parsed = Dictionary::from_text(text);
    assert_eq!(loaded.entries(), parsed.entries());
    assert_eq!(
        loaded.lookup_forward("om").to_string(),
        "Did you mean:\nomu \u{2014} in, inside"
    );
}

#[test]
fn invalid_utf8_is_a_read_failure() {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(b"omu in\n\xff\xfe broken\n").unwrap();
    let err = Dictionary::load(&FileSource::new(file.path())).unwrap_err();
    assert!(matches!(err, LoadError::Read { line: 2, .. }), "{err}");
}
