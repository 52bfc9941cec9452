//! Documents: text, file binding, encoding and undo history.
//!
//! A [`Document`] is the state behind one editor tab. It owns its text, the path it is bound
//! to (if any), the cached [`TextEncoding`], the `modified` flag and an [`UndoEngine`].
//!
//! `modified` is cleared by a successful load or save and set by every edit made through the
//! editing methods. Undo and redo restore text without touching it.

use crate::debounce::DEFAULT_DEBOUNCE;
use crate::encoding::{self, EncodingError, TextEncoding, default_new_file_encoding};
use crate::line_ending::LineEnding;
use crate::text::{char_len, char_slice, splice};
use crate::undo::{Restored, UndoEngine, UndoStep};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Title shown for documents without a file path.
pub const UNTITLED: &str = "Untitled";

/// Application name appended to window titles.
pub const APP_NAME: &str = "WriteBox";

/// Errors from loading or saving a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Decoding or encoding the file contents failed.
    #[error("{}: {source}", path.display())]
    Encoding {
        /// File path.
        path: PathBuf,
        /// Underlying encoding error.
        source: EncodingError,
    },
    /// The document has never been given a path; the caller must ask for one.
    #[error("the document has no file path")]
    NoFilePath,
}

/// Settings applied to every document a workspace creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Quiet period before typed text becomes an undo step.
    pub undo_debounce: Duration,
    /// Encoding used when saving to a path that does not exist yet.
    pub new_file_encoding: TextEncoding,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            undo_debounce: DEFAULT_DEBOUNCE,
            new_file_encoding: default_new_file_encoding(),
        }
    }
}

/// One open text document.
#[derive(Debug, Clone)]
pub struct Document {
    content: String,
    file_path: Option<PathBuf>,
    modified: bool,
    cursor: usize,
    selection: Option<Range<usize>>,
    encoding: Option<TextEncoding>,
    line_ending: LineEnding,
    undo: UndoEngine,
    options: DocumentOptions,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty, untitled document.
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    /// An empty, untitled document using `options`.
    pub fn with_options(options: DocumentOptions) -> Self {
        Self {
            content: String::new(),
            file_path: None,
            modified: false,
            cursor: 0,
            selection: None,
            encoding: None,
            line_ending: LineEnding::default(),
            undo: UndoEngine::new(String::new(), options.undo_debounce),
            options,
        }
    }

    /// Load `path`, detecting the encoding unless `encoding_hint` is given.
    pub fn load(
        path: impl AsRef<Path>,
        encoding_hint: Option<TextEncoding>,
    ) -> Result<Self, DocumentError> {
        Self::load_with(path, encoding_hint, DocumentOptions::default())
    }

    /// Load `path` with explicit document options.
    pub fn load_with(
        path: impl AsRef<Path>,
        encoding_hint: Option<TextEncoding>,
        options: DocumentOptions,
    ) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let requested = encoding_hint.unwrap_or_else(|| encoding::detect(&bytes));
        let (raw, effective) =
            encoding::decode(&bytes, requested).map_err(|source| DocumentError::Encoding {
                path: path.to_path_buf(),
                source,
            })?;
        let line_ending = LineEnding::detect_in_text(&raw);
        let content = LineEnding::normalize(raw);

        tracing::debug!(
            path = %path.display(),
            encoding = %effective,
            chars = char_len(&content),
            "loaded document"
        );

        Ok(Self {
            undo: UndoEngine::new(content.clone(), options.undo_debounce),
            content,
            file_path: Some(path.to_path_buf()),
            modified: false,
            cursor: 0,
            selection: None,
            encoding: Some(effective),
            line_ending,
            options,
        })
    }

    /// Write the document to its path.
    ///
    /// Encoding policy: a path that does not exist yet gets the configured new-file encoding
    /// (UTF-16 by default); an existing file with no cached encoding is re-detected from its
    /// current bytes; otherwise the cached encoding is reused. On failure `modified` is left
    /// untouched.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let path = self.file_path.clone().ok_or(DocumentError::NoFilePath)?;

        let encoding = if !path.exists() {
            self.options.new_file_encoding
        } else if let Some(encoding) = self.encoding {
            encoding
        } else {
            let current = std::fs::read(&path).map_err(|source| DocumentError::Read {
                path: path.clone(),
                source,
            })?;
            encoding::detect(&current)
        };

        let text = self.line_ending.apply_to_text(&self.content);
        let bytes =
            encoding::encode(&text, encoding).map_err(|source| DocumentError::Encoding {
                path: path.clone(),
                source,
            })?;
        std::fs::write(&path, bytes).map_err(|source| DocumentError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), encoding = %encoding, "saved document");
        self.encoding = Some(encoding);
        self.modified = false;
        Ok(())
    }

    /// Bind the document to `path` and save. The previous path is restored if saving fails.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), DocumentError> {
        let previous = self.file_path.replace(path.into());
        let result = self.save();
        if result.is_err() {
            self.file_path = previous;
        }
        result
    }

    /// Tab title: the file name (or `Untitled`), with `*` when modified.
    pub fn title(&self) -> String {
        let name = self
            .file_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_string());
        if self.modified {
            format!("{name}*")
        } else {
            name
        }
    }

    /// Window title: `<title> - WriteBox`.
    pub fn window_title(&self) -> String {
        format!("{} - {APP_NAME}", self.title())
    }

    /// The full text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The bound file path, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Returns `true` if the text differs from the last load/save.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Cursor position (character offset).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current selection (character range), if any.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// The selected text, if any.
    pub fn selected_text(&self) -> Option<&str> {
        self.selection
            .clone()
            .map(|range| char_slice(&self.content, range))
    }

    /// The cached encoding, once resolved by a load or save.
    pub fn encoding(&self) -> Option<TextEncoding> {
        self.encoding
    }

    /// The line ending used on save.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Number of characters in the text.
    pub fn char_count(&self) -> usize {
        char_len(&self.content)
    }

    /// Move the cursor (clamped to the text) and clear the selection.
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.char_count());
        self.selection = None;
    }

    /// Select `range` (clamped); the cursor moves to its end.
    pub fn set_selection(&mut self, range: Range<usize>) {
        let len = self.char_count();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        self.selection = Some(start..end);
        self.cursor = end;
    }

    /// Replace the whole text as a user edit.
    pub fn set_text(&mut self, text: impl Into<String>, cursor: usize, now: Instant) {
        self.content = text.into();
        self.cursor = cursor.min(self.char_count());
        self.selection = None;
        self.record_edit(now);
    }

    /// Insert `text` at character `offset` as a user edit.
    pub fn insert(&mut self, offset: usize, text: &str, now: Instant) {
        let offset = offset.min(self.char_count());
        self.replace_range(offset..offset, text, now);
    }

    /// Replace the character `range` with `text` as a user edit; the cursor ends after `text`.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str, now: Instant) {
        let len = self.char_count();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        self.content = splice(&self.content, start..end, text);
        self.cursor = start + char_len(text);
        self.selection = None;
        self.record_edit(now);
    }

    fn record_edit(&mut self, now: Instant) {
        self.modified = true;
        self.undo.notify_edit(&self.content, self.cursor, now);
    }

    /// Drive the undo debounce timer; returns `true` if a step was committed.
    pub fn poll_undo(&mut self, now: Instant) -> bool {
        self.undo.poll(now)
    }

    /// Commit any pending edit to the undo history now.
    pub fn flush_undo(&mut self) -> bool {
        self.undo.flush()
    }

    /// Undo one step. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.undo() {
            Some(restored) => {
                self.apply_restored(restored);
                true
            }
            None => false,
        }
    }

    /// Redo one step. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.undo.redo() {
            Some(restored) => {
                self.apply_restored(restored);
                true
            }
            None => false,
        }
    }

    fn apply_restored(&mut self, restored: Restored) {
        self.content = restored.text;
        self.cursor = restored.cursor;
        self.selection = None;
    }

    /// Returns `true` if there is a step to undo.
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Returns `true` if there is a step to redo (ignoring a pending, uncommitted edit).
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Committed undo steps, oldest first.
    pub fn history(&self) -> &[UndoStep] {
        self.undo.steps()
    }

    /// Number of history steps currently applied.
    pub fn history_position(&self) -> usize {
        self.undo.pointer()
    }

    /// Read-only access to the undo engine.
    pub fn undo_engine(&self) -> &UndoEngine {
        &self.undo
    }
}
