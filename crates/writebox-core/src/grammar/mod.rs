//! Spelling and grammar checking.
//!
//! The engine itself sits behind [`GrammarChecker`]. [`CheckerLoader`] brings one up in the
//! background per process and [`GrammarSession`] walks its issues for one document.

mod basic;
mod checker;
mod loader;
mod session;

pub use basic::{BasicChecker, WHITESPACE_RULE, WORD_REPEAT_RULE};
pub use checker::{CheckerError, GrammarChecker, GrammarIssue};
pub use loader::{CheckerLoader, LoadOutcome, LoaderStatus, SharedChecker};
pub use session::{CheckStatus, Corrected, GrammarError, GrammarSession, SessionState};
