//! Character-offset helpers shared by the document, search and grammar modules.
//!
//! All public offsets in `writebox-core` count Unicode scalar values (`char`s), not bytes.

use std::ops::Range;

/// Maps character offsets to byte offsets (and back) for a single `&str` snapshot.
#[derive(Debug)]
pub(crate) struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    pub(crate) fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    pub(crate) fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte
            .get(clamped)
            .copied()
            .unwrap_or(self.text_len)
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }
}

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the character at `char_offset`, clamped to the end of `text`.
pub(crate) fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Returns the substring covering the character range `range` (clamped).
pub fn char_slice(text: &str, range: Range<usize>) -> &str {
    let start = char_to_byte(text, range.start);
    let end = char_to_byte(text, range.end.max(range.start));
    &text[start..end]
}

/// Replace the character range `range` of `text` with `replacement`.
pub fn splice(text: &str, range: Range<usize>, replacement: &str) -> String {
    let start = char_to_byte(text, range.start);
    let end = char_to_byte(text, range.end.max(range.start));
    let mut out = String::with_capacity(text.len() - (end - start) + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    out
}

/// Character offset of the end of the first line (block) of `text`.
pub fn end_of_first_block(text: &str) -> usize {
    text.chars().take_while(|&ch| ch != '\n').count()
}

/// Character range of the line containing `offset`, excluding the line break.
pub fn line_range_at(text: &str, offset: usize) -> Range<usize> {
    let last_line = text.matches('\n').count();
    let mut start = 0;
    for (idx, line) in text.split('\n').enumerate() {
        let len = char_len(line);
        let end = start + len;
        let is_last = idx == last_line;
        if offset <= end || is_last {
            let visible = line.strip_suffix('\r').map(char_len).unwrap_or(len);
            return start..start + visible;
        }
        start = end + 1;
    }
    start..start
}
