use std::ops::Range;
use thiserror::Error;

/// One problem reported by a grammar checker, in character offsets of the checked text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarIssue {
    /// The flagged text.
    pub matched_text: String,
    /// Start character offset.
    pub offset: usize,
    /// Length in characters.
    pub length: usize,
    /// Identifier grouping related issues (e.g. `WORD_REPEAT_RULE`).
    pub rule_id: String,
    /// Suggested replacements, best first.
    pub replacements: Vec<String>,
    /// Explanation for the user.
    pub message: String,
}

impl GrammarIssue {
    /// The flagged character range.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Failures of the external checker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckerError {
    /// The checker could not be started.
    #[error("grammar checker failed to load: {0}")]
    Load(String),
    /// A check request failed.
    #[error("grammar check failed: {0}")]
    Check(String),
}

/// A spelling/grammar checking engine.
///
/// `check` is a synchronous request over a full-text snapshot. An empty result means the text
/// has no issues.
pub trait GrammarChecker: Send + Sync {
    /// Check `text` and return its issues ordered by offset.
    fn check(&self, text: &str) -> Result<Vec<GrammarIssue>, CheckerError>;
}
