//! Find/replace sessions over a document scope.
//!
//! A [`FindSession`] is what a Find/Replace panel keeps between button presses: the query, the
//! scope anchor captured when the panel opened, and the offset where the next search starts.
//! Searching past the last match does not wrap on its own; the session reports
//! [`FindOutcome::ReachedEnd`] and the caller decides whether to [`FindSession::wrap_around`].

use crate::document::Document;
use crate::search::{self, SearchError, SearchMatch, SearchOptions};
use crate::text::{char_len, char_slice, line_range_at};
use std::ops::Range;
use std::time::Instant;

/// The region of the document a search or replace covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// The whole text.
    #[default]
    Document,
    /// The text block (newline-delimited line) under the cursor.
    Paragraph,
    /// The line containing the cursor.
    CurrentLine,
    /// The selected text.
    Selection,
}

impl SearchScope {
    /// Resolve the scope to a character range of `text`.
    pub fn resolve(
        self,
        text: &str,
        cursor: usize,
        selection: Option<Range<usize>>,
    ) -> Result<Range<usize>, SearchError> {
        let len = char_len(text);
        let cursor = cursor.min(len);
        match self {
            Self::Document => Ok(0..len),
            Self::CurrentLine | Self::Paragraph => Ok(line_range_at(text, cursor)),
            Self::Selection => {
                let range = selection.ok_or(SearchError::NoSelection)?;
                let start = range.start.min(len);
                Ok(start..range.end.clamp(start, len))
            }
        }
    }
}

/// What to look for, where, and how.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    /// The literal text or regex pattern.
    pub pattern: String,
    /// The region searched.
    pub scope: SearchScope,
    /// Case/whole-word/regex flags.
    pub options: SearchOptions,
}

impl SearchQuery {
    /// A document-wide query with default options.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    /// Set the scope.
    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of [`FindSession::find_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOutcome {
    /// A match, in document character offsets; it is now the document's selection.
    Found(SearchMatch),
    /// Nothing after the session offset, but the search did not start at the top: the caller
    /// may offer to wrap around.
    ReachedEnd,
    /// Nothing in the whole scope.
    NotFound,
}

/// Find/replace state that persists between invocations.
#[derive(Debug, Clone)]
pub struct FindSession {
    query: SearchQuery,
    cursor_offset: usize,
    anchor_cursor: usize,
    anchor_selection: Option<Range<usize>>,
}

impl FindSession {
    /// Start a session; the scope is anchored at the document's current cursor and selection.
    pub fn new(query: SearchQuery, document: &Document) -> Self {
        Self {
            query,
            cursor_offset: 0,
            anchor_cursor: document.cursor(),
            anchor_selection: document.selection(),
        }
    }

    /// The active query.
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Change the query (e.g. the user edited the pattern); the offset is kept.
    pub fn set_query(&mut self, query: SearchQuery) {
        self.query = query;
    }

    /// Scope-relative offset where the next search starts.
    pub fn cursor_offset(&self) -> usize {
        self.cursor_offset
    }

    /// Restart the next search at the beginning of the scope.
    pub fn wrap_around(&mut self) {
        self.cursor_offset = 0;
    }

    /// The scope's character range within `document`.
    pub fn scope_range(&self, document: &Document) -> Result<Range<usize>, SearchError> {
        self.query.scope.resolve(
            document.content(),
            self.anchor_cursor,
            self.anchor_selection.clone(),
        )
    }

    /// Find the next match and select it in `document`.
    ///
    /// Invalid patterns leave both the document and the session unchanged.
    pub fn find_next(&mut self, document: &mut Document) -> Result<FindOutcome, SearchError> {
        let scope = self.scope_range(document)?;
        let scope_text = char_slice(document.content(), scope.clone());

        let found = search::find_next(
            scope_text,
            &self.query.pattern,
            self.query.options,
            self.cursor_offset,
        )?;

        let Some(m) = found else {
            tracing::debug!(pattern = %self.query.pattern, from = self.cursor_offset, "no match");
            return Ok(if self.cursor_offset > 0 {
                FindOutcome::ReachedEnd
            } else {
                FindOutcome::NotFound
            });
        };

        self.cursor_offset = m.end;
        let absolute = SearchMatch {
            start: scope.start + m.start,
            end: scope.start + m.end,
        };
        document.set_selection(absolute.start..absolute.end);
        Ok(FindOutcome::Found(absolute))
    }

    /// Replace the current selection (normally the last match) with `replacement`.
    ///
    /// Returns `false` when nothing is selected.
    pub fn replace_current(
        &mut self,
        document: &mut Document,
        replacement: &str,
        now: Instant,
    ) -> bool {
        let Some(selection) = document.selection() else {
            return false;
        };
        document.replace_range(selection, replacement, now);
        true
    }

    /// Replace every occurrence in the scope and merge the result back into `document`.
    ///
    /// The whole scope is rewritten as one edit. Returns the number of replacements; the
    /// session restarts from the top of the scope.
    pub fn replace_all(
        &mut self,
        document: &mut Document,
        replacement: &str,
        now: Instant,
    ) -> Result<usize, SearchError> {
        let scope = self.scope_range(document)?;
        let scope_text = char_slice(document.content(), scope.clone());
        let replaced = search::replace_all(
            scope_text,
            &self.query.pattern,
            replacement,
            self.query.options,
        )?;

        if replaced.count > 0 && replaced.text != scope_text {
            let new_len = char_len(&replaced.text);
            document.replace_range(scope.clone(), &replaced.text, now);
            // Keep the anchored selection covering the rewritten region.
            if self.anchor_selection.is_some() {
                self.anchor_selection = Some(scope.start..scope.start + new_len);
            }
        }

        tracing::debug!(count = replaced.count, "replace all");
        self.cursor_offset = 0;
        Ok(replaced.count)
    }
}
