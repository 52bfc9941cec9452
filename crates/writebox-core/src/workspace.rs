//! The set of open documents behind the tab bar.
//!
//! Each [`Document`] gets a [`DocumentId`] when it is opened and keeps it until it is closed;
//! ids are never reused, so closing a tab does not invalidate handles to the others. Tab order
//! is tracked separately from the id map.
//!
//! A workspace always holds at least one document: it starts with an untitled one and refuses
//! to close the last.

use crate::document::{Document, DocumentError, DocumentOptions};
use crate::encoding::TextEncoding;
use crate::search::{SearchError, SearchMatch, SearchOptions, find_all};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Opaque identifier for an open document in a [`Workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// The user's answer to "save changes before closing?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    /// Save this document, then close it.
    Save,
    /// Save every document that has a path, then close this one.
    SaveAll,
    /// Close without saving.
    Discard,
    /// Keep the document open.
    Cancel,
}

/// A document that failed to save during [`Workspace::save_all`].
#[derive(Debug)]
pub struct SaveFailure {
    /// The document.
    pub id: DocumentId,
    /// Why saving failed.
    pub error: DocumentError,
}

/// Workspace-level errors.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A document id was not found.
    #[error("no open document with id {}", .0.get())]
    DocumentNotFound(DocumentId),
    /// The last open document cannot be closed.
    #[error("cannot close the last open document")]
    LastDocument,
    /// Loading or saving a document failed.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// Some documents could not be saved.
    #[error("{} document(s) could not be saved", .0.len())]
    SaveFailed(Vec<SaveFailure>),
}

/// Search matches for a single open document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSearchResult {
    /// Document id.
    pub id: DocumentId,
    /// File path, if the document has one.
    pub path: Option<PathBuf>,
    /// All matches in this document (character offsets, half-open).
    pub matches: Vec<SearchMatch>,
}

/// Open documents in tab order, plus the active one.
#[derive(Debug)]
pub struct Workspace {
    next_id: u64,
    documents: BTreeMap<DocumentId, Document>,
    tabs: Vec<DocumentId>,
    active: DocumentId,
    options: DocumentOptions,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(DocumentOptions::default())
    }
}

impl Workspace {
    /// A workspace holding one untitled document.
    pub fn new(options: DocumentOptions) -> Self {
        let first = DocumentId(0);
        Self {
            next_id: 1,
            documents: BTreeMap::from([(first, Document::with_options(options))]),
            tabs: vec![first],
            active: first,
            options,
        }
    }

    /// Options new documents are created with.
    pub fn options(&self) -> DocumentOptions {
        self.options
    }

    /// Number of open documents.
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Always `false`: a workspace keeps at least one document.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Document ids in tab order.
    pub fn ids(&self) -> &[DocumentId] {
        &self.tabs
    }

    /// The active document's id.
    pub fn active(&self) -> DocumentId {
        self.active
    }

    /// Switch tabs.
    pub fn set_active(&mut self, id: DocumentId) -> Result<(), WorkspaceError> {
        self.ensure_open(id)?;
        self.active = id;
        Ok(())
    }

    /// Look up a document.
    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// Look up a document for editing.
    pub fn document_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    /// The active document.
    pub fn active_document(&self) -> &Document {
        // `active` always names an open document.
        &self.documents[&self.active]
    }

    /// The active document, for editing.
    pub fn active_document_mut(&mut self) -> &mut Document {
        self.documents
            .get_mut(&self.active)
            .unwrap_or_else(|| unreachable!("active document is always open"))
    }

    fn ensure_open(&self, id: DocumentId) -> Result<(), WorkspaceError> {
        if self.documents.contains_key(&id) {
            Ok(())
        } else {
            Err(WorkspaceError::DocumentNotFound(id))
        }
    }

    fn insert(&mut self, document: Document) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.documents.insert(id, document);
        self.tabs.push(id);
        self.active = id;
        id
    }

    /// Open a new untitled tab and make it active.
    pub fn new_document(&mut self) -> DocumentId {
        let id = self.insert(Document::with_options(self.options));
        tracing::debug!(id = id.get(), "new document");
        id
    }

    /// The id of the open document bound to `path`, if any.
    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        self.tabs
            .iter()
            .copied()
            .find(|id| self.documents[id].file_path() == Some(path))
    }

    /// Load `path` into a tab and make it active.
    ///
    /// A file that is already open is just activated. A pristine untitled active tab (no path,
    /// no text, no edits) is replaced rather than left behind.
    pub fn open(
        &mut self,
        path: impl AsRef<Path>,
        encoding: Option<TextEncoding>,
    ) -> Result<DocumentId, WorkspaceError> {
        let path = path.as_ref();
        if let Some(id) = self.find_by_path(path) {
            self.active = id;
            return Ok(id);
        }

        let document = Document::load_with(path, encoding, self.options)?;

        let current = self.active_document();
        if current.file_path().is_none() && !current.is_modified() && current.content().is_empty()
        {
            self.documents.insert(self.active, document);
            return Ok(self.active);
        }

        Ok(self.insert(document))
    }

    /// Whether closing `id` should ask the user to save first.
    pub fn needs_save_prompt(&self, id: DocumentId) -> Result<bool, WorkspaceError> {
        self.documents
            .get(&id)
            .map(Document::is_modified)
            .ok_or(WorkspaceError::DocumentNotFound(id))
    }

    /// Close `id` according to `choice`.
    ///
    /// Returns `Ok(true)` when the tab was closed and `Ok(false)` when the user cancelled.
    /// A failed save keeps the tab open. `choice` is ignored for unmodified documents.
    pub fn close(&mut self, id: DocumentId, choice: SaveChoice) -> Result<bool, WorkspaceError> {
        self.ensure_open(id)?;
        if self.tabs.len() == 1 {
            return Err(WorkspaceError::LastDocument);
        }

        if self.needs_save_prompt(id)? {
            match choice {
                SaveChoice::Cancel => return Ok(false),
                SaveChoice::Discard => {}
                SaveChoice::Save => {
                    if let Some(document) = self.documents.get_mut(&id) {
                        document.save()?;
                    }
                }
                SaveChoice::SaveAll => {
                    let failures = self.save_all();
                    if !failures.is_empty() {
                        return Err(WorkspaceError::SaveFailed(failures));
                    }
                    if self.needs_save_prompt(id)? {
                        // Untitled documents are skipped by save_all.
                        return Err(DocumentError::NoFilePath.into());
                    }
                }
            }
        }

        self.remove(id);
        Ok(true)
    }

    fn remove(&mut self, id: DocumentId) {
        let Some(position) = self.tabs.iter().position(|tab| *tab == id) else {
            return;
        };
        self.tabs.remove(position);
        self.documents.remove(&id);

        if self.active == id {
            let next = position.min(self.tabs.len().saturating_sub(1));
            if let Some(next) = self.tabs.get(next) {
                self.active = *next;
            }
        }
        tracing::debug!(id = id.get(), "closed document");
    }

    /// Close every tab except `keep` that has no unsaved changes.
    ///
    /// Returns the modified documents left open, in tab order, so the caller can prompt for
    /// each and finish with [`Workspace::close`]. `keep` becomes active.
    pub fn close_others(&mut self, keep: DocumentId) -> Result<Vec<DocumentId>, WorkspaceError> {
        self.ensure_open(keep)?;
        self.active = keep;

        let others: Vec<_> = self.tabs.iter().copied().filter(|id| *id != keep).collect();
        let mut left_open = Vec::new();
        for id in others {
            if self.documents[&id].is_modified() {
                left_open.push(id);
            } else {
                self.remove(id);
            }
        }
        Ok(left_open)
    }

    /// Save every document that has a file path.
    ///
    /// Untitled documents are skipped. A failure does not stop the remaining saves.
    pub fn save_all(&mut self) -> Vec<SaveFailure> {
        let mut failures = Vec::new();
        for id in &self.tabs {
            let Some(document) = self.documents.get_mut(id) else {
                continue;
            };
            if document.file_path().is_none() {
                continue;
            }
            if let Err(error) = document.save() {
                tracing::warn!(id = id.get(), "{error}");
                failures.push(SaveFailure { id: *id, error });
            }
        }
        failures
    }

    /// Tab labels in tab order.
    pub fn tab_titles(&self) -> Vec<(DocumentId, String)> {
        self.tabs
            .iter()
            .map(|id| (*id, self.documents[id].title()))
            .collect()
    }

    /// Search all open documents, in tab order.
    ///
    /// Documents without matches are omitted.
    pub fn search_all_documents(
        &self,
        pattern: &str,
        options: SearchOptions,
    ) -> Result<Vec<DocumentSearchResult>, SearchError> {
        let mut out = Vec::new();
        for id in &self.tabs {
            let document = &self.documents[id];
            let matches = find_all(document.content(), pattern, options)?;
            if matches.is_empty() {
                continue;
            }
            out.push(DocumentSearchResult {
                id: *id,
                path: document.file_path().map(Path::to_path_buf),
                matches,
            });
        }
        Ok(out)
    }
}
