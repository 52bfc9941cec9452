//! Walking a document's grammar issues one at a time.
//!
//! A session holds the issue batch produced by the last check and a cursor into it. Any edit
//! it makes (replace, replace-all-by-rule) shifts offsets, so the text is checked again and the
//! cursor returns to the first issue. Ignoring never re-runs the checker.

use super::checker::{CheckerError, GrammarIssue};
use super::loader::{CheckerLoader, LoadOutcome, SharedChecker};
use crate::text::splice;
use std::sync::mpsc::{Receiver, TryRecvError};
use thiserror::Error;

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The checker has not finished loading.
    #[error("the grammar checker is still loading")]
    NotReady,
    /// The checker failed to load; the session cannot be used.
    #[error("{0}")]
    CheckerFailed(CheckerError),
    /// A check request failed.
    #[error(transparent)]
    Checker(#[from] CheckerError),
    /// There is no issue under the cursor.
    #[error("there is no current grammar issue")]
    NoCurrentIssue,
}

/// Lifecycle of a session's checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Not attached to a checker yet.
    Uninitialized,
    /// Waiting for the shared checker to finish loading.
    CheckerLoading,
    /// Checks can run.
    Ready,
    /// The checker failed to load. Terminal.
    Failed(CheckerError),
}

/// What the session is showing after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// The issue at this index of [`GrammarSession::issues`] is current.
    Issue(usize),
    /// The first check of the session found nothing.
    NoErrors,
    /// All issues have been visited.
    EndOfDocument,
}

/// Result of an operation that edits the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corrected {
    /// The new full text; the caller installs it in the document.
    pub text: String,
    /// Session status after re-checking `text`.
    pub status: CheckStatus,
}

/// A spell/grammar check pass over one document.
pub struct GrammarSession {
    state: SessionState,
    checker: Option<SharedChecker>,
    ready_rx: Option<Receiver<LoadOutcome>>,
    issues: Vec<GrammarIssue>,
    index: usize,
    shown_any: bool,
}

impl std::fmt::Debug for GrammarSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarSession")
            .field("state", &self.state)
            .field("issues", &self.issues.len())
            .field("index", &self.index)
            .field("shown_any", &self.shown_any)
            .finish()
    }
}

impl Default for GrammarSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarSession {
    /// A session with no checker attached.
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            checker: None,
            ready_rx: None,
            issues: Vec::new(),
            index: 0,
            shown_any: false,
        }
    }

    /// A session using `checker` directly.
    pub fn with_checker(checker: SharedChecker) -> Self {
        let mut session = Self::new();
        session.become_ready(checker);
        session
    }

    /// Attach to `loader`, becoming ready now or when the load finishes.
    pub fn attach(&mut self, loader: &CheckerLoader) -> &SessionState {
        self.ready_rx = Some(loader.subscribe());
        self.state = SessionState::CheckerLoading;
        self.poll_ready()
    }

    /// Check (without blocking) whether the checker became available.
    pub fn poll_ready(&mut self) -> &SessionState {
        if let Some(rx) = &self.ready_rx {
            match rx.try_recv() {
                Ok(outcome) => self.resolve(outcome),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.resolve(Err(CheckerError::Load(
                    "checker loader went away".to_string(),
                ))),
            }
        }
        &self.state
    }

    /// Block until the checker is available (or failed to load).
    pub fn wait_ready(&mut self) -> Result<(), GrammarError> {
        if let Some(rx) = &self.ready_rx {
            let outcome = rx.recv().unwrap_or_else(|_| {
                Err(CheckerError::Load("checker loader went away".to_string()))
            });
            self.resolve(outcome);
        }
        self.ensure_ready()
    }

    fn resolve(&mut self, outcome: LoadOutcome) {
        self.ready_rx = None;
        match outcome {
            Ok(checker) => self.become_ready(checker),
            Err(err) => self.state = SessionState::Failed(err),
        }
    }

    fn become_ready(&mut self, checker: SharedChecker) {
        self.checker = Some(checker);
        self.state = SessionState::Ready;
    }

    fn ensure_ready(&self) -> Result<(), GrammarError> {
        match &self.state {
            SessionState::Ready => Ok(()),
            SessionState::Failed(err) => Err(GrammarError::CheckerFailed(err.clone())),
            SessionState::Uninitialized | SessionState::CheckerLoading => {
                Err(GrammarError::NotReady)
            }
        }
    }

    /// Lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Check `text`, replacing the issue batch and resetting the cursor.
    pub fn run_check(&mut self, text: &str) -> Result<&[GrammarIssue], GrammarError> {
        self.ensure_ready()?;
        let checker = self.checker.as_ref().ok_or(GrammarError::NotReady)?;
        let issues = checker.check(text)?;
        tracing::debug!(issues = issues.len(), "grammar check");
        self.issues = issues;
        self.index = 0;
        Ok(&self.issues)
    }

    /// Begin a new pass: run the first check and show the first issue.
    pub fn start(&mut self, text: &str) -> Result<CheckStatus, GrammarError> {
        self.run_check(text)?;
        self.shown_any = false;
        Ok(self.show_current())
    }

    /// Report what is under the cursor, remembering that an issue has been shown.
    pub fn show_current(&mut self) -> CheckStatus {
        if self.index < self.issues.len() {
            self.shown_any = true;
            CheckStatus::Issue(self.index)
        } else if self.shown_any {
            CheckStatus::EndOfDocument
        } else {
            CheckStatus::NoErrors
        }
    }

    /// The current batch.
    pub fn issues(&self) -> &[GrammarIssue] {
        &self.issues
    }

    /// Cursor index into [`GrammarSession::issues`].
    pub fn index(&self) -> usize {
        self.index
    }

    /// The issue under the cursor.
    pub fn current(&self) -> Option<&GrammarIssue> {
        self.issues.get(self.index)
    }

    /// Move to the next issue.
    pub fn advance(&mut self) -> CheckStatus {
        if self.index < self.issues.len() {
            self.index += 1;
        }
        self.show_current()
    }

    /// Skip the current issue.
    pub fn ignore(&mut self) -> CheckStatus {
        self.advance()
    }

    /// Drop every issue sharing the current issue's rule; the cursor index stays put.
    pub fn ignore_all_by_rule(&mut self) -> Result<CheckStatus, GrammarError> {
        let rule_id = self
            .current()
            .map(|issue| issue.rule_id.clone())
            .ok_or(GrammarError::NoCurrentIssue)?;
        self.issues.retain(|issue| issue.rule_id != rule_id);
        Ok(self.show_current())
    }

    /// Replace the current issue's span in `text` with `replacement`, then re-check.
    pub fn replace_current(
        &mut self,
        text: &str,
        replacement: &str,
    ) -> Result<Corrected, GrammarError> {
        let range = self
            .current()
            .map(GrammarIssue::range)
            .ok_or(GrammarError::NoCurrentIssue)?;
        let corrected = splice(text, range, replacement);
        self.recheck(corrected)
    }

    /// Replace every issue sharing the current issue's rule, then re-check.
    ///
    /// Spans are spliced from the highest offset down so earlier offsets stay valid. A span
    /// overlapping one already replaced is skipped.
    pub fn replace_all_by_rule(
        &mut self,
        text: &str,
        replacement: &str,
    ) -> Result<Corrected, GrammarError> {
        let rule_id = self
            .current()
            .map(|issue| issue.rule_id.clone())
            .ok_or(GrammarError::NoCurrentIssue)?;

        let mut ranges: Vec<_> = self
            .issues
            .iter()
            .filter(|issue| issue.rule_id == rule_id)
            .map(GrammarIssue::range)
            .collect();
        ranges.sort_by(|a, b| b.start.cmp(&a.start));

        let mut corrected = text.to_string();
        let mut limit = usize::MAX;
        for range in ranges {
            if range.end > limit {
                continue;
            }
            limit = range.start;
            corrected = splice(&corrected, range, replacement);
        }

        self.recheck(corrected)
    }

    fn recheck(&mut self, corrected: String) -> Result<Corrected, GrammarError> {
        self.run_check(&corrected)?;
        let status = self.show_current();
        Ok(Corrected {
            text: corrected,
            status,
        })
    }
}
