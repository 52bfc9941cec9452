use pretty_assertions::assert_eq;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use writebox_core::grammar::{
    BasicChecker, CheckStatus, CheckerError, CheckerLoader, GrammarChecker, GrammarError,
    GrammarIssue, GrammarSession, LoaderStatus, SessionState, SharedChecker,
};

/// Reports every occurrence of fixed words, each under its own rule id.
struct WordList {
    words: Vec<(&'static str, &'static str)>,
}

impl GrammarChecker for WordList {
    fn check(&self, text: &str) -> Result<Vec<GrammarIssue>, CheckerError> {
        let mut issues = Vec::new();
        for (word, rule) in &self.words {
            for (byte, _) in text.match_indices(word) {
                issues.push(GrammarIssue {
                    matched_text: word.to_string(),
                    offset: text[..byte].chars().count(),
                    length: word.chars().count(),
                    rule_id: rule.to_string(),
                    replacements: vec![],
                    message: format!("{word} is flagged"),
                });
            }
        }
        issues.sort_by_key(|issue| issue.offset);
        Ok(issues)
    }
}

fn session(words: Vec<(&'static str, &'static str)>) -> GrammarSession {
    GrammarSession::with_checker(Arc::new(WordList { words }))
}

#[test]
fn replace_all_by_rule_changes_length_by_count_times_delta() {
    let text = "teh cat and teh dog and teh end";
    let mut session = session(vec![("teh", "SPELLING")]);
    assert_eq!(session.start(text).unwrap(), CheckStatus::Issue(0));
    let k = session.issues().len();

    let corrected = session.replace_all_by_rule(text, "the!").unwrap();
    let expected = text.chars().count() + k * ("the!".len() - "teh".len());
    assert_eq!(corrected.text.chars().count(), expected);
    assert_eq!(corrected.text, "the! cat and the! dog and the! end");
    assert_eq!(corrected.status, CheckStatus::EndOfDocument);
}

#[test]
fn replace_all_by_rule_leaves_other_rules_alone() {
    let text = "teh recieve teh";
    let mut session = session(vec![("teh", "A"), ("recieve", "B")]);
    session.start(text).unwrap();

    let corrected = session.replace_all_by_rule(text, "the").unwrap();
    assert_eq!(corrected.text, "the recieve the");
    assert_eq!(corrected.status, CheckStatus::Issue(0));
    assert_eq!(session.current().unwrap().rule_id, "B");
}

#[test]
fn ignore_all_keeps_the_index() {
    let text = "x y x y";
    let mut session = session(vec![("x", "X"), ("y", "Y")]);
    session.start(text).unwrap();
    assert_eq!(session.advance(), CheckStatus::Issue(1));
    assert_eq!(session.current().unwrap().rule_id, "Y");

    assert_eq!(session.ignore_all_by_rule().unwrap(), CheckStatus::Issue(1));
    assert_eq!(session.index(), 1);
    let rules: Vec<_> = session.issues().iter().map(|i| i.rule_id.as_str()).collect();
    assert_eq!(rules, vec!["X", "X"]);
}

#[test]
fn no_errors_versus_end_of_document() {
    let mut clean = session(vec![("zzz", "Z")]);
    assert_eq!(clean.start("fine text").unwrap(), CheckStatus::NoErrors);

    let mut one = session(vec![("bad", "B")]);
    assert_eq!(one.start("bad").unwrap(), CheckStatus::Issue(0));
    assert_eq!(one.ignore(), CheckStatus::EndOfDocument);
    assert_eq!(one.ignore(), CheckStatus::EndOfDocument);
}

#[test]
fn restarting_on_clean_text_reports_no_errors() {
    let text = "bad and bad";
    let mut session = session(vec![("bad", "B")]);
    assert_eq!(session.start(text).unwrap(), CheckStatus::Issue(0));
    let corrected = session.replace_all_by_rule(text, "good").unwrap();
    assert_eq!(corrected.status, CheckStatus::EndOfDocument);

    assert_eq!(session.start(&corrected.text).unwrap(), CheckStatus::NoErrors);
}

#[test]
fn replace_current_rechecks() {
    let text = "bad and bad";
    let mut session = session(vec![("bad", "B")]);
    session.start(text).unwrap();
    let corrected = session.replace_current(text, "good").unwrap();
    assert_eq!(corrected.text, "good and bad");
    assert_eq!(session.issues().len(), 1);
    assert_eq!(session.current().unwrap().offset, 9);
}

#[test]
fn operations_without_an_issue_fail() {
    let mut session = session(vec![]);
    session.start("anything").unwrap();
    assert_eq!(
        session.replace_current("anything", "x"),
        Err(GrammarError::NoCurrentIssue)
    );
    assert_eq!(
        session.ignore_all_by_rule(),
        Err(GrammarError::NoCurrentIssue)
    );
}

#[test]
fn unattached_session_is_not_ready() {
    let mut session = GrammarSession::new();
    assert_eq!(session.run_check("x").unwrap_err(), GrammarError::NotReady);
}

#[test]
fn loader_wakes_every_early_subscriber_once() {
    let loader = CheckerLoader::new();
    let early_a = loader.subscribe();
    let early_b = loader.subscribe();

    let (release_tx, release_rx) = mpsc::channel::<()>();
    assert!(loader.start(move || {
        let _ = release_rx.recv();
        let checker = BasicChecker::new()?;
        Ok(Arc::new(checker) as SharedChecker)
    }));
    assert!(!loader.start(|| Err(CheckerError::Load("second start".into()))));
    assert!(matches!(loader.status(), LoaderStatus::Loading));

    release_tx.send(()).unwrap();
    for rx in [early_a, early_b] {
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap().is_ok());
        assert!(rx.try_recv().is_err());
    }

    let late = loader.subscribe();
    assert!(late.try_recv().unwrap().is_ok());
    assert!(loader.checker().is_some());
}

#[test]
fn failed_load_is_reported_to_sessions() {
    let loader = CheckerLoader::new();
    let mut session = GrammarSession::new();
    session.attach(&loader);
    assert_eq!(session.state(), &SessionState::CheckerLoading);

    loader.start(|| Err(CheckerError::Load("no engine".into())));
    let err = session.wait_ready().unwrap_err();
    assert_eq!(
        err,
        GrammarError::CheckerFailed(CheckerError::Load("no engine".into()))
    );
    assert!(matches!(session.state(), SessionState::Failed(_)));
    assert!(matches!(loader.status(), LoaderStatus::Failed(_)));
}

#[test]
fn panicking_factory_fails_the_load() {
    let loader = CheckerLoader::new();
    let rx = loader.subscribe();
    loader.start(|| panic!("engine exploded"));
    let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(outcome, Err(CheckerError::Load(_))));
}

#[test]
fn basic_checker_drives_a_session() {
    let checker = BasicChecker::new().unwrap();
    let mut session = GrammarSession::with_checker(Arc::new(checker));
    let text = "It  is is fine";
    assert_eq!(session.start(text).unwrap(), CheckStatus::Issue(0));

    let fixed = session.replace_current(text, " ").unwrap();
    assert_eq!(fixed.text, "It is is fine");
    let issue = session.current().unwrap().clone();
    let fixed = session
        .replace_current(&fixed.text, &issue.replacements[0])
        .unwrap();
    assert_eq!(fixed.text, "It is fine");
    assert_eq!(fixed.status, CheckStatus::EndOfDocument);
}
