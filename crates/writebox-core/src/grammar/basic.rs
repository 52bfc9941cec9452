//! A small built-in checker for the CLI and tests.

use super::checker::{CheckerError, GrammarChecker, GrammarIssue};
use regex::Regex;

/// Rule id for an immediately repeated word ("the the").
pub const WORD_REPEAT_RULE: &str = "WORD_REPEAT_RULE";
/// Rule id for runs of two or more spaces between words.
pub const WHITESPACE_RULE: &str = "WHITESPACE_RULE";

/// Rule-based checker that needs no external engine.
#[derive(Debug, Clone)]
pub struct BasicChecker {
    word: Regex,
    spaces: Regex,
}

impl BasicChecker {
    /// Build the checker.
    pub fn new() -> Result<Self, CheckerError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|err| CheckerError::Load(err.to_string()))
        };
        Ok(Self {
            word: compile(r"\w+")?,
            spaces: compile(r"\S( {2,})\S")?,
        })
    }

    fn repeated_words(&self, text: &str, issues: &mut Vec<GrammarIssue>) {
        let words: Vec<_> = self.word.find_iter(text).collect();
        let mut skip_next = false;
        for pair in words.windows(2) {
            if skip_next {
                skip_next = false;
                continue;
            }
            let (first, second) = (pair[0], pair[1]);
            let gap = &text[first.end()..second.start()];
            let separated_by_blanks = !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t');
            if !separated_by_blanks || first.as_str().to_lowercase() != second.as_str().to_lowercase() {
                continue;
            }

            issues.push(issue_for(
                text,
                first.start()..second.end(),
                WORD_REPEAT_RULE,
                vec![first.as_str().to_string()],
                "Possible typo: you repeated a word",
            ));
            // "a a a" reports one pair at a time.
            skip_next = true;
        }
    }

    fn extra_spaces(&self, text: &str, issues: &mut Vec<GrammarIssue>) {
        let mut from = 0;
        while let Some(caps) = self.spaces.captures_at(text, from) {
            let Some(run) = caps.get(1) else { break };
            issues.push(issue_for(
                text,
                run.start()..run.end(),
                WHITESPACE_RULE,
                vec![" ".to_string()],
                "Possible typo: you repeated a whitespace",
            ));
            // The trailing non-space may begin the next run's context.
            from = run.end();
        }
    }
}

fn issue_for(
    text: &str,
    bytes: std::ops::Range<usize>,
    rule_id: &str,
    replacements: Vec<String>,
    message: &str,
) -> GrammarIssue {
    let offset = text[..bytes.start].chars().count();
    let matched_text = text[bytes].to_string();
    GrammarIssue {
        length: matched_text.chars().count(),
        matched_text,
        offset,
        rule_id: rule_id.to_string(),
        replacements,
        message: message.to_string(),
    }
}

impl GrammarChecker for BasicChecker {
    fn check(&self, text: &str) -> Result<Vec<GrammarIssue>, CheckerError> {
        let mut issues = Vec::new();
        self.repeated_words(text, &mut issues);
        self.extra_spaces(text, &mut issues);
        issues.sort_by_key(|issue| issue.offset);
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn check(text: &str) -> Vec<GrammarIssue> {
        BasicChecker::new().unwrap().check(text).unwrap()
    }

    #[test]
    fn repeated_word_spans_both_words() {
        let issues = check("I saw the the cat");
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.rule_id, WORD_REPEAT_RULE);
        assert_eq!(issue.matched_text, "the the");
        assert_eq!(issue.range(), 6..13);
        assert_eq!(issue.replacements, vec!["the".to_string()]);
    }

    #[test]
    fn repeats_across_lines_or_punctuation_are_fine() {
        assert!(check("the\nthe").is_empty());
        assert!(check("the, the").is_empty());
    }

    #[test]
    fn double_spaces_between_words() {
        let issues = check("one  two   three");
        let ranges: Vec<_> = issues.iter().map(GrammarIssue::range).collect();
        assert_eq!(ranges, vec![3..5, 8..11]);
        assert!(issues.iter().all(|i| i.rule_id == WHITESPACE_RULE));
    }

    #[test]
    fn offsets_count_chars() {
        let issues = check("héé  x");
        assert_eq!(issues[0].range(), 3..5);
    }

    #[test]
    fn issues_are_sorted() {
        let issues = check("a  b b");
        let rules: Vec<_> = issues.iter().map(|i| i.rule_id.as_str()).collect();
        assert_eq!(rules, vec![WHITESPACE_RULE, WORD_REPEAT_RULE]);
    }
}
