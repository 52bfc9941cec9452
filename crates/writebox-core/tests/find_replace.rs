use pretty_assertions::assert_eq;
use std::time::Instant;
use writebox_core::search::{find_all, find_next, replace_all};
use writebox_core::{
    Document, FindOutcome, FindSession, SearchError, SearchMatch, SearchOptions, SearchQuery,
    SearchScope,
};

fn opts(match_case: bool, whole_word: bool, use_regex: bool) -> SearchOptions {
    SearchOptions {
        match_case,
        whole_word,
        use_regex,
    }
}

fn doc_with(text: &str) -> Document {
    let mut doc = Document::new();
    doc.insert(0, text, Instant::now());
    doc.set_cursor(0);
    doc
}

#[test]
fn whole_word_skips_embedded_occurrences() {
    let m = find_next("concatenate cat scatter", "cat", opts(false, true, false), 0).unwrap();
    assert_eq!(m, Some(SearchMatch { start: 12, end: 15 }));
}

#[test]
fn case_insensitive_regex_replace_all() {
    let out = replace_all("aAaa bb AAA", "a+", "b", opts(false, false, true)).unwrap();
    assert_eq!(out.text, "b bb b");
    assert_eq!(out.count, 2);
}

#[test]
fn case_insensitive_literal_keeps_other_text_intact() {
    let out = replace_all("Hello HELLO World", "hello", "bye", opts(false, false, false)).unwrap();
    assert_eq!(out.text, "bye bye World");
}

#[test]
fn regex_replacement_expands_groups() {
    let out = replace_all("2024-01-31", r"(\d+)-(\d+)-(\d+)", "$3/$2/$1", opts(true, false, true))
        .unwrap();
    assert_eq!(out.text, "31/01/2024");
}

#[test]
fn literal_replacement_is_verbatim() {
    let out = replace_all("cost", "cost", "$1", opts(true, false, false)).unwrap();
    assert_eq!(out.text, "$1");
}

#[test]
fn invalid_regex_is_reported() {
    assert!(matches!(
        find_all("abc", "(", opts(false, false, true)),
        Err(SearchError::InvalidPattern(_))
    ));
}

#[test]
fn offsets_are_characters() {
    let matches = find_all("ééé x ééé", "ééé", opts(true, true, false)).unwrap();
    assert_eq!(
        matches,
        vec![
            SearchMatch { start: 0, end: 3 },
            SearchMatch { start: 6, end: 9 }
        ]
    );
}

#[test]
fn session_offers_wraparound_only_after_a_match() {
    let mut doc = doc_with("one two one");
    let mut session = FindSession::new(SearchQuery::new("one"), &doc);

    assert_eq!(
        session.find_next(&mut doc).unwrap(),
        FindOutcome::Found(SearchMatch { start: 0, end: 3 })
    );
    assert_eq!(doc.selection(), Some(0..3));
    assert_eq!(
        session.find_next(&mut doc).unwrap(),
        FindOutcome::Found(SearchMatch { start: 8, end: 11 })
    );
    assert_eq!(session.find_next(&mut doc).unwrap(), FindOutcome::ReachedEnd);

    session.wrap_around();
    assert_eq!(
        session.find_next(&mut doc).unwrap(),
        FindOutcome::Found(SearchMatch { start: 0, end: 3 })
    );

    let mut missing = FindSession::new(SearchQuery::new("zzz"), &doc);
    assert_eq!(missing.find_next(&mut doc).unwrap(), FindOutcome::NotFound);
}

#[test]
fn current_line_scope_only_touches_that_line() {
    let mut doc = doc_with("cat\ncat cat\ncat");
    doc.set_cursor(5);
    let query = SearchQuery::new("cat").with_scope(SearchScope::CurrentLine);
    let mut session = FindSession::new(query, &doc);

    let count = session.replace_all(&mut doc, "dog", Instant::now()).unwrap();
    assert_eq!(count, 2);
    assert_eq!(doc.content(), "cat\ndog dog\ncat");
}

#[test]
fn selection_scope_replace_all_is_one_undo_step() {
    let mut doc = doc_with("aa [aa aa] aa");
    let now = Instant::now();
    doc.flush_undo();
    doc.set_selection(4..9);

    let query = SearchQuery::new("aa").with_scope(SearchScope::Selection);
    let mut session = FindSession::new(query, &doc);
    assert_eq!(session.replace_all(&mut doc, "b", now).unwrap(), 2);
    assert_eq!(doc.content(), "aa [b b] aa");
    assert_eq!(session.scope_range(&doc).unwrap(), 4..7);

    doc.flush_undo();
    assert!(doc.undo());
    assert_eq!(doc.content(), "aa [aa aa] aa");
}

#[test]
fn selection_scope_without_selection_fails() {
    let mut doc = doc_with("text");
    let query = SearchQuery::new("t").with_scope(SearchScope::Selection);
    let mut session = FindSession::new(query, &doc);
    assert!(matches!(
        session.find_next(&mut doc),
        Err(SearchError::NoSelection)
    ));
}

#[test]
fn replace_current_replaces_the_selected_match() {
    let mut doc = doc_with("red green red");
    let mut session = FindSession::new(SearchQuery::new("red"), &doc);
    session.find_next(&mut doc).unwrap();
    assert!(session.replace_current(&mut doc, "blue", Instant::now()));
    assert_eq!(doc.content(), "blue green red");
    assert!(!session.replace_current(&mut doc, "blue", Instant::now()));
}
