//! Coalesced undo/redo.
//!
//! Edits are not recorded one keystroke at a time. Every content change is reported with
//! [`UndoEngine::notify_edit`], which (re)arms a debounce timer; once the document has been
//! quiet for the debounce window, [`UndoEngine::poll`] commits a single [`UndoStep`] holding the
//! full text before and after the burst.
//!
//! History is strictly linear: `steps[..pointer]` can be undone, `steps[pointer..]` can be
//! redone, and committing a new step drops the redo tail.
//!
//! Applying an undo or redo never re-enters [`UndoEngine::notify_edit`]; callers must not report
//! the restored text as an edit.

use crate::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use crate::text::{char_len, end_of_first_block};
use std::time::{Duration, Instant};

/// Describe an edit for a history view.
///
/// Growth is reported as the characters beyond the old text's length (`Typed '…'`); anything
/// else is `Removed text`.
pub fn derive_label(old_text: &str, new_text: &str) -> String {
    let old_len = char_len(old_text);
    if char_len(new_text) > old_len {
        let added: String = new_text.chars().skip(old_len).collect();
        format!("Typed '{added}'")
    } else {
        "Removed text".to_string()
    }
}

/// One committed, undoable change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoStep {
    old_text: String,
    new_text: String,
    cursor_after_redo: usize,
    label: String,
}

impl UndoStep {
    /// Build a step; the label is derived once here.
    pub fn new(old_text: String, new_text: String, cursor_after_redo: usize) -> Self {
        let label = derive_label(&old_text, &new_text);
        Self {
            old_text,
            new_text,
            cursor_after_redo,
            label,
        }
    }

    /// Text before the step.
    pub fn old_text(&self) -> &str {
        &self.old_text
    }

    /// Text after the step.
    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    /// Cursor offset restored by redo.
    pub fn cursor_after_redo(&self) -> usize {
        self.cursor_after_redo
    }

    /// Human-readable description.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Text and cursor produced by an undo or redo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    /// The full text to install.
    pub text: String,
    /// Where the cursor goes (character offset).
    pub cursor: usize,
}

#[derive(Debug, Clone)]
struct PendingEdit {
    text: String,
    cursor: usize,
}

/// Per-document undo history with debounced edit coalescing.
#[derive(Debug, Clone)]
pub struct UndoEngine {
    steps: Vec<UndoStep>,
    pointer: usize,
    last_committed: String,
    debouncer: Debouncer<PendingEdit>,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new(String::new(), DEFAULT_DEBOUNCE)
    }
}

impl UndoEngine {
    /// Create an empty history whose baseline is `baseline`.
    pub fn new(baseline: impl Into<String>, debounce: Duration) -> Self {
        Self {
            steps: Vec::new(),
            pointer: 0,
            last_committed: baseline.into(),
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Report the current text after a user edit, restarting the debounce window.
    pub fn notify_edit(&mut self, latest_text: &str, cursor: usize, now: Instant) {
        self.debouncer.push(
            PendingEdit {
                text: latest_text.to_string(),
                cursor,
            },
            now,
        );
    }

    /// Commit the pending edit if the debounce window has elapsed.
    ///
    /// Returns `true` if a step was pushed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(pending) => self.commit(pending),
            None => false,
        }
    }

    /// Commit the pending edit immediately.
    pub fn flush(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(pending) => self.commit(pending),
            None => false,
        }
    }

    fn commit(&mut self, pending: PendingEdit) -> bool {
        if pending.text == self.last_committed {
            return false;
        }

        let old_text = std::mem::replace(&mut self.last_committed, pending.text.clone());
        let step = UndoStep::new(old_text, pending.text, pending.cursor);
        tracing::debug!(label = step.label(), depth = self.pointer + 1, "committed undo step");

        self.steps.truncate(self.pointer);
        self.steps.push(step);
        self.pointer = self.steps.len();
        true
    }

    /// Undo one step. Pending edits are committed first.
    ///
    /// The cursor lands at the end of the first block of the restored text.
    pub fn undo(&mut self) -> Option<Restored> {
        self.flush();
        if !self.can_undo() {
            return None;
        }

        self.pointer -= 1;
        let step = &self.steps[self.pointer];
        self.last_committed = step.old_text.clone();
        Some(Restored {
            text: step.old_text.clone(),
            cursor: end_of_first_block(&step.old_text),
        })
    }

    /// Redo one step. Pending edits are committed first (which drops the redo tail).
    pub fn redo(&mut self) -> Option<Restored> {
        self.flush();
        if !self.can_redo() {
            return None;
        }

        let step = &self.steps[self.pointer];
        self.pointer += 1;
        self.last_committed = step.new_text.clone();
        Some(Restored {
            text: step.new_text.clone(),
            cursor: step.cursor_after_redo.min(char_len(&step.new_text)),
        })
    }

    /// Returns `true` if there is a step to undo.
    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    /// Returns `true` if there is a step to redo.
    pub fn can_redo(&self) -> bool {
        self.pointer < self.steps.len()
    }

    /// Returns `true` if an edit is waiting for the debounce window.
    pub fn has_pending_edit(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Deadline of the pending edit, for hosts that schedule a wake-up.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// All committed steps, oldest first.
    pub fn steps(&self) -> &[UndoStep] {
        &self.steps
    }

    /// Number of steps currently applied.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// The text the next committed step will start from.
    pub fn last_committed_text(&self) -> &str {
        &self.last_committed
    }
}
