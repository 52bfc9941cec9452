//! Line ending helpers.
//!
//! Documents hold LF (`'\n'`) text in memory. A file that uses CRLF (`"\r\n"`) is normalized
//! on load and the line ending is remembered so that saving writes it back unchanged.

/// The newline sequence a document is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    #[default]
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineEnding {
    /// Detect the line ending of freshly decoded text.
    ///
    /// The dominant ending wins: [`LineEnding::Crlf`] only when CRLF pairs outnumber bare LFs.
    pub fn detect_in_text(text: &str) -> Self {
        let crlf = text.matches("\r\n").count();
        let lf = text.matches('\n').count() - crlf;
        if crlf > lf { Self::Crlf } else { Self::Lf }
    }

    /// Convert decoded file text to the in-memory LF form.
    pub fn normalize(text: String) -> String {
        if text.contains("\r\n") {
            text.replace("\r\n", "\n")
        } else {
            text
        }
    }

    /// Convert LF text to this line ending for saving.
    pub fn apply_to_text(self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            Self::Crlf => text.replace('\n', "\r\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_is_detected_and_restored() {
        let raw = "a\r\nb\r\n".to_string();
        let ending = LineEnding::detect_in_text(&raw);
        assert_eq!(ending, LineEnding::Crlf);
        let text = LineEnding::normalize(raw);
        assert_eq!(text, "a\nb\n");
        assert_eq!(ending.apply_to_text(&text), "a\r\nb\r\n");
    }

    #[test]
    fn mixed_endings_follow_the_majority() {
        assert_eq!(LineEnding::detect_in_text("a\r\nb\r\nc\n"), LineEnding::Crlf);
        assert_eq!(LineEnding::detect_in_text("a\r\nb\nc\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect_in_text("a\r\nb\nc"), LineEnding::Lf);
        assert_eq!(LineEnding::detect_in_text("no newline"), LineEnding::Lf);
    }
}
