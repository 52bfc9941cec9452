//! Text encoding detection and conversion.
//!
//! A document remembers the [`TextEncoding`] it was loaded (or first saved) with. Detection
//! prefers a byte-order mark, then strict UTF-8, then the statistical guess of `chardetng`.
//! Conversion is delegated to `encoding_rs`, except for UTF-16 output which `encoding_rs`
//! does not provide.

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use thiserror::Error;

/// Errors produced while resolving, decoding or encoding text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The encoding label is not known.
    #[error("unknown encoding '{0}'")]
    UnknownLabel(String),
    /// The bytes are not valid in the given encoding.
    #[error("the file is not valid {encoding}")]
    Malformed {
        /// Name of the encoding that rejected the input.
        encoding: &'static str,
    },
    /// The text contains characters that the encoding cannot represent.
    #[error("the text contains characters that cannot be saved as {encoding}")]
    Unmappable {
        /// Name of the target encoding.
        encoding: &'static str,
    },
}

/// An encoding plus whether a byte-order mark is part of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding {
    encoding: &'static Encoding,
    bom: bool,
}

/// The encoding used for files that do not exist yet: UTF-16 (little endian) with a BOM.
pub fn default_new_file_encoding() -> TextEncoding {
    TextEncoding::new(UTF_16LE, true)
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

impl TextEncoding {
    /// UTF-8 without a byte-order mark.
    pub fn utf8() -> Self {
        Self::new(UTF_8, false)
    }

    /// Create from an `encoding_rs` encoding.
    pub fn new(encoding: &'static Encoding, bom: bool) -> Self {
        Self { encoding, bom }
    }

    /// Resolve a user-supplied label such as `utf-8`, `utf-16`, `latin1` or `shift_jis`.
    ///
    /// `utf-16` (no endianness) writes a BOM, `utf-8-sig` is UTF-8 with a BOM.
    pub fn for_label(label: &str) -> Result<Self, EncodingError> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        let (lookup, bom) = match normalized.as_str() {
            "utf-16" | "utf16" => ("utf-16le", true),
            "utf-16-le" => ("utf-16le", false),
            "utf-16-be" => ("utf-16be", false),
            "utf-8-sig" | "utf8-sig" => ("utf-8", true),
            "latin-1" => ("latin1", false),
            other => (other, false),
        };

        Encoding::for_label(lookup.as_bytes())
            .or_else(|| Encoding::for_label(label.trim().as_bytes()))
            .map(|encoding| Self { encoding, bom })
            .ok_or_else(|| EncodingError::UnknownLabel(label.to_string()))
    }

    /// The underlying `encoding_rs` encoding.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Whether a byte-order mark is written on save.
    pub fn has_bom(&self) -> bool {
        self.bom
    }

    /// Canonical WHATWG name of the encoding (e.g. `UTF-16LE`, `windows-1252`).
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    fn bom_bytes(&self) -> &'static [u8] {
        if !self.bom {
            return &[];
        }
        if self.encoding == UTF_8 {
            &[0xEF, 0xBB, 0xBF]
        } else if self.encoding == UTF_16LE {
            &[0xFF, 0xFE]
        } else if self.encoding == UTF_16BE {
            &[0xFE, 0xFF]
        } else {
            &[]
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.bom {
            write!(f, "{} (BOM)", self.name())
        } else {
            f.write_str(self.name())
        }
    }
}

fn is_utf16(encoding: &'static Encoding) -> bool {
    encoding == UTF_16LE || encoding == UTF_16BE
}

/// Infer the encoding of raw file bytes.
pub fn detect(bytes: &[u8]) -> TextEncoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return TextEncoding::new(encoding, true);
    }
    if std::str::from_utf8(bytes).is_ok() {
        return TextEncoding::utf8();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, true);
    tracing::debug!(encoding = guess.name(), "guessed encoding from content");
    TextEncoding::new(guess, false)
}

/// Decode `bytes` as `encoding`, treating malformed input as an error.
///
/// A byte-order mark matching the encoding is stripped; a UTF-16 BOM of the other byte
/// order overrides a UTF-16 request. Returns the text and the effective encoding.
pub fn decode(
    bytes: &[u8],
    encoding: TextEncoding,
) -> Result<(String, TextEncoding), EncodingError> {
    let mut effective = TextEncoding::new(encoding.encoding, false);
    let mut body = bytes;

    if let Some((bom_encoding, bom_len)) = Encoding::for_bom(bytes)
        && (bom_encoding == encoding.encoding
            || (is_utf16(bom_encoding) && is_utf16(encoding.encoding)))
    {
        effective = TextEncoding::new(bom_encoding, true);
        body = &bytes[bom_len..];
    }

    let text = effective
        .encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or(EncodingError::Malformed {
            encoding: effective.name(),
        })?;

    Ok((text.into_owned(), effective))
}

/// Encode `text` as `encoding`, prefixing the byte-order mark when the encoding carries one.
pub fn encode(text: &str, encoding: TextEncoding) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::with_capacity(text.len() + 3);
    out.extend_from_slice(encoding.bom_bytes());

    if encoding.encoding == UTF_16LE {
        for unit in text.encode_utf16() {
            out.extend_from_slice(&unit.to_le_bytes());
        }
    } else if encoding.encoding == UTF_16BE {
        for unit in text.encode_utf16() {
            out.extend_from_slice(&unit.to_be_bytes());
        }
    } else {
        let (bytes, _, unmappable) = encoding.encoding.encode(text);
        if unmappable {
            return Err(EncodingError::Unmappable {
                encoding: encoding.name(),
            });
        }
        out.extend_from_slice(&bytes);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_wins_over_content() {
        let bytes = [0xFF, 0xFE, b'h', 0, b'i', 0];
        let detected = detect(&bytes);
        assert_eq!(detected, default_new_file_encoding());
        let (text, effective) = decode(&bytes, detected).unwrap();
        assert_eq!(text, "hi");
        assert!(effective.has_bom());
    }

    #[test]
    fn ascii_and_utf8_detect_as_utf8() {
        assert_eq!(detect(b"plain"), TextEncoding::utf8());
        assert_eq!(detect("caf\u{e9}".as_bytes()), TextEncoding::utf8());
    }

    #[test]
    fn legacy_bytes_fall_back_to_a_single_byte_guess() {
        // "café crème" in windows-1252
        let bytes = b"caf\xe9 cr\xe8me br\xfbl\xe9e";
        let detected = detect(bytes);
        assert_ne!(detected.encoding(), UTF_8);
        let (text, _) = decode(bytes, detected).unwrap();
        assert!(text.starts_with("caf"));
    }

    #[test]
    fn labels_resolve_python_style_names() {
        assert_eq!(
            TextEncoding::for_label("utf-16").unwrap(),
            default_new_file_encoding()
        );
        assert_eq!(TextEncoding::for_label("UTF_8").unwrap(), TextEncoding::utf8());
        assert!(TextEncoding::for_label("utf-8-sig").unwrap().has_bom());
        assert_eq!(
            TextEncoding::for_label("latin-1").unwrap().name(),
            "windows-1252"
        );
        assert!(matches!(
            TextEncoding::for_label("klingon"),
            Err(EncodingError::UnknownLabel(_))
        ));
    }

    #[test]
    fn malformed_utf8_is_rejected() {
        let err = decode(b"ab\xff\xfd", TextEncoding::utf8()).unwrap_err();
        assert_eq!(err, EncodingError::Malformed { encoding: "UTF-8" });
    }

    #[test]
    fn utf16_encoding_writes_bom_and_little_endian_units() {
        let bytes = encode("A\u{e9}", default_new_file_encoding()).unwrap();
        assert_eq!(bytes, vec![0xFF, 0xFE, 0x41, 0x00, 0xE9, 0x00]);
    }

    #[test]
    fn unmappable_characters_are_reported() {
        let latin1 = TextEncoding::for_label("latin1").unwrap();
        let err = encode("snow \u{2603}", latin1).unwrap_err();
        assert!(matches!(err, EncodingError::Unmappable { .. }));
    }
}
