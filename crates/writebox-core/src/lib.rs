#![warn(missing_docs)]
//! WriteBox Core - headless engine for a tabbed plain-text editor
//!
//! # Overview
//!
//! `writebox-core` holds everything behind the editor window that is not UI: documents with
//! encoding-aware load/save, a debounced linear undo history, find/replace over a selectable
//! scope, and a background-loaded grammar checker. Rendering, dialogs and menus belong to the
//! host, which drives this crate through plain method calls and a polled undo timer.
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use writebox_core::{Document, DocumentOptions};
//!
//! let mut doc = Document::with_options(DocumentOptions {
//!     undo_debounce: Duration::from_millis(500),
//!     ..DocumentOptions::default()
//! });
//!
//! let t0 = Instant::now();
//! doc.insert(0, "hello", t0);
//! assert_eq!(doc.title(), "Untitled*");
//!
//! // The edit becomes an undo step once the debounce window passes.
//! assert!(doc.poll_undo(t0 + Duration::from_millis(600)));
//! assert!(doc.undo());
//! assert_eq!(doc.content(), "");
//! ```
//!
//! # Module Description
//!
//! - [`encoding`] - detection, decoding and encoding of file bytes
//! - [`document`] - one open document and its file binding
//! - [`undo`] - debounced undo steps
//! - [`search`] - stateless find/replace over a string
//! - [`find`] - scoped find/replace sessions over a document
//! - [`grammar`] - checker trait, global loader and check sessions
//! - [`workspace`] - open documents keyed by stable ids
//! - [`config`] - YAML configuration
//!
//! # Offsets
//!
//! Every offset and range in the public API counts `char`s, not bytes.

pub mod config;
pub mod debounce;
pub mod document;
pub mod encoding;
pub mod find;
pub mod grammar;
pub mod line_ending;
pub mod link;
pub mod search;
pub mod text;
pub mod undo;
pub mod workspace;
pub mod zoom;

pub use config::{ConfigError, EditorConfig};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use document::{APP_NAME, Document, DocumentError, DocumentOptions, UNTITLED};
pub use encoding::{EncodingError, TextEncoding};
pub use find::{FindOutcome, FindSession, SearchQuery, SearchScope};
pub use grammar::{
    BasicChecker, CheckStatus, CheckerError, CheckerLoader, Corrected, GrammarChecker,
    GrammarError, GrammarIssue, GrammarSession, SessionState,
};
pub use line_ending::LineEnding;
pub use link::link_at;
pub use search::{Replaced, SearchError, SearchMatch, SearchOptions};
pub use undo::{UndoEngine, UndoStep, derive_label};
pub use workspace::{DocumentId, SaveChoice, Workspace, WorkspaceError};
pub use zoom::Zoom;
