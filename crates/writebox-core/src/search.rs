//! Text search and replace.
//!
//! Stateless helpers over a UTF-8 `&str`, using **character offsets** (not byte offsets) for
//! all public inputs/outputs. They support:
//!
//! - plain substring search (escaped and compiled into a regex)
//! - regex search
//! - optional case-insensitive matching
//! - optional whole-word matching
//!
//! Whole-word matching differs by mode. Literal queries accept an occurrence only when the
//! characters on both sides are not alphanumeric (buffer edges count as non-alphanumeric).
//! Regex queries are wrapped in `\b` word-boundary anchors instead.

use crate::text::CharIndex;
use regex::{NoExpand, Regex, RegexBuilder};
use thiserror::Error;

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub match_case: bool,
    /// If `true`, matches only whole words.
    pub whole_word: bool,
    /// If `true`, treats the query as a regex pattern.
    pub use_regex: bool,
}

/// A match returned by the search APIs, expressed as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl SearchMatch {
    /// Returns the length of the match in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Search errors.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// The provided regex pattern failed to compile.
    #[error("invalid regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),
    /// The selection scope was requested without a selection.
    #[error("there is no selection to search in")]
    NoSelection,
}

/// Result of a replace-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced {
    /// The rewritten text.
    pub text: String,
    /// How many occurrences were replaced.
    pub count: usize,
}

fn compile_search_regex(pattern: &str, options: SearchOptions) -> Result<Regex, SearchError> {
    let pattern = if options.use_regex {
        if options.whole_word {
            format!(r"\b(?:{pattern})\b")
        } else {
            pattern.to_string()
        }
    } else {
        regex::escape(pattern)
    };

    Ok(RegexBuilder::new(&pattern)
        .case_insensitive(!options.match_case)
        .build()?)
}

/// Literal whole-word mode checks neighbours by hand; regex mode anchors with `\b`.
fn needs_boundary_check(options: SearchOptions) -> bool {
    options.whole_word && !options.use_regex
}

fn is_boundary(ch: Option<char>) -> bool {
    !ch.is_some_and(char::is_alphanumeric)
}

fn is_whole_word(text: &str, start_byte: usize, end_byte: usize) -> bool {
    let before = text[..start_byte].chars().next_back();
    let after = text[end_byte..].chars().next();
    is_boundary(before) && is_boundary(after)
}

/// Find the next occurrence of `pattern` in `text`, searching forward from `from_char`.
///
/// - Returns `Ok(None)` if no match is found (or if `pattern` is empty).
/// - Match ranges are character offsets and are half-open (`[start, end)`).
pub fn find_next(
    text: &str,
    pattern: &str,
    options: SearchOptions,
    from_char: usize,
) -> Result<Option<SearchMatch>, SearchError> {
    if pattern.is_empty() {
        return Ok(None);
    }

    let re = compile_search_regex(pattern, options)?;
    let index = CharIndex::new(text);

    let mut start_char = from_char.min(index.char_count());
    loop {
        let start_byte = index.char_to_byte(start_char);
        let Some(m) = re.find_at(text, start_byte) else {
            return Ok(None);
        };

        let start = index.byte_to_char(m.start());
        let end = index.byte_to_char(m.end());
        let candidate = SearchMatch { start, end };

        if candidate.is_empty() {
            if end >= index.char_count() {
                return Ok(None);
            }
            start_char = end + 1;
            continue;
        }

        if needs_boundary_check(options) && !is_whole_word(text, m.start(), m.end()) {
            start_char = candidate.end;
            continue;
        }

        return Ok(Some(candidate));
    }
}

/// Find all occurrences of `pattern` in `text`.
///
/// - Returns an empty list if `pattern` is empty.
/// - Match ranges are character offsets and are half-open (`[start, end)`).
pub fn find_all(
    text: &str,
    pattern: &str,
    options: SearchOptions,
) -> Result<Vec<SearchMatch>, SearchError> {
    if pattern.is_empty() {
        return Ok(Vec::new());
    }

    let re = compile_search_regex(pattern, options)?;
    let index = CharIndex::new(text);

    let mut matches: Vec<SearchMatch> = Vec::new();
    for m in re.find_iter(text) {
        if m.is_empty() {
            continue;
        }
        if needs_boundary_check(options) && !is_whole_word(text, m.start(), m.end()) {
            continue;
        }

        matches.push(SearchMatch {
            start: index.byte_to_char(m.start()),
            end: index.byte_to_char(m.end()),
        });
    }

    Ok(matches)
}

/// Replace every occurrence of `pattern` in `text` with `replacement`.
///
/// - Regex mode is a single global substitution; `$1`/`${name}` in `replacement` expand to
///   capture groups.
/// - Plain literal mode is a global substitution with `replacement` inserted verbatim.
/// - Whole-word literal mode scans left to right and resumes after each inserted replacement,
///   so a replacement is never re-examined, even when it completes a new whole word.
pub fn replace_all(
    text: &str,
    pattern: &str,
    replacement: &str,
    options: SearchOptions,
) -> Result<Replaced, SearchError> {
    if pattern.is_empty() {
        return Ok(Replaced {
            text: text.to_string(),
            count: 0,
        });
    }

    let re = compile_search_regex(pattern, options)?;

    if needs_boundary_check(options) {
        return Ok(replace_whole_words(text, &re, replacement));
    }

    let count = re.find_iter(text).count();
    let text = if options.use_regex {
        re.replace_all(text, replacement).into_owned()
    } else {
        re.replace_all(text, NoExpand(replacement)).into_owned()
    };
    Ok(Replaced { text, count })
}

fn replace_whole_words(text: &str, re: &Regex, replacement: &str) -> Replaced {
    // `out` always holds the rewritten text up to byte `emitted` of the original, so the
    // character before a candidate is read from whichever side it lives on.
    let mut out = String::with_capacity(text.len());
    let mut emitted = 0;
    let mut search_from = 0;
    let mut count = 0;

    while let Some(m) = re.find_at(text, search_from) {
        let before = if m.start() == emitted {
            out.chars().next_back()
        } else {
            text[..m.start()].chars().next_back()
        };
        let after = text[m.end()..].chars().next();

        if is_boundary(before) && is_boundary(after) {
            out.push_str(&text[emitted..m.start()]);
            out.push_str(replacement);
            emitted = m.end();
            count += 1;
        }
        search_from = m.end();
    }

    out.push_str(&text[emitted..]);
    Replaced { text: out, count }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(match_case: bool, whole_word: bool, use_regex: bool) -> SearchOptions {
        SearchOptions {
            match_case,
            whole_word,
            use_regex,
        }
    }

    #[test]
    fn anchors_match_only_at_the_ends_of_the_text() {
        let text = "dog\ncat\ncat";
        assert_eq!(find_next(text, "^cat", opts(true, false, true), 0).unwrap(), None);
        assert_eq!(
            find_all(text, "cat$", opts(true, false, true)).unwrap(),
            vec![SearchMatch { start: 8, end: 11 }]
        );
    }

    #[test]
    fn whole_word_literal_treats_underscore_as_a_boundary() {
        let m = find_next("snake_cat", "cat", opts(true, true, false), 0).unwrap();
        assert_eq!(m, Some(SearchMatch { start: 6, end: 9 }));
    }

    #[test]
    fn whole_word_replacement_is_not_rescanned() {
        // Replacing "a" with "a a": the inserted text would qualify again if re-examined.
        let out = replace_all("a b", "a", "a a", opts(true, true, false)).unwrap();
        assert_eq!(out.text, "a a b");
        assert_eq!(out.count, 1);
    }

    #[test]
    fn whole_word_boundary_sees_preceding_replacement() {
        // In the original text the second "-a" follows an 'a'; after the first replacement it
        // follows '-', so it qualifies.
        let out = replace_all("-a-a", "-a", "-", opts(true, true, false)).unwrap();
        assert_eq!(out.text, "--");
        assert_eq!(out.count, 2);
    }
}
