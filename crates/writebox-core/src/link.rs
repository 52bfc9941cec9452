//! Detecting a URL under the cursor.

use crate::text::CharIndex;
use url::Url;

/// The URL in the whitespace-delimited token around `offset` (a character offset).
///
/// Only absolute URLs with a host count, so `mailto:` and bare words are ignored. Trailing
/// sentence punctuation is not part of the link.
pub fn link_at(text: &str, offset: usize) -> Option<Url> {
    let index = CharIndex::new(text);
    let byte = index.char_to_byte(offset.min(index.char_count()));

    let start = text[..byte]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let end = text[byte..]
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, _)| byte + i)
        .unwrap_or(text.len());

    let token = text[start..end].trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '"', '\'']);
    if token.is_empty() {
        return None;
    }

    let url = Url::parse(token).ok()?;
    url.host_str().is_some_and(|host| !host.is_empty()).then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_url_under_the_cursor() {
        let text = "see https://example.com/docs. for more";
        let url = link_at(text, 10).unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs");
    }

    #[test]
    fn plain_words_are_not_links() {
        assert!(link_at("hello world", 2).is_none());
        assert!(link_at("write to mailto:me@example.com", 12).is_none());
        assert!(link_at("", 0).is_none());
    }

    #[test]
    fn cursor_at_token_end_still_counts() {
        let text = "go http://a.b";
        assert!(link_at(text, text.chars().count()).is_some());
    }
}
