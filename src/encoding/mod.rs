//! Encoding detection and transcoding.
//!
//! Turns the raw bytes of a file into the text the parser works on, bridging
//! to `encoding_rs` for everything that is not UTF-8.
//!
//! # Encoding Detection Strategy
//!
//! 1. Check for a Byte Order Mark (BOM) at the start of the input.
//! 2. If a BOM is found, use the indicated encoding and skip the BOM bytes.
//! 3. If no BOM is found, assume UTF-8.
//! 4. Inspect the XML declaration's `encoding=` attribute to confirm or
//!    override the detected encoding.
//! 5. Bytes that are neither valid UTF-8 nor in a known declared encoding
//!    are read as single-byte windows-1252 text.

use encoding_rs::{Encoding, WINDOWS_1252};
use memchr::memmem;
use thiserror::Error;

/// An error that occurs during transcoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The encoding label is not known to `encoding_rs`.
    #[error("unsupported encoding: {0}")]
    Unsupported(String),
    /// The input contains byte sequences invalid in the named encoding.
    #[error("malformed byte sequence for encoding {0}")]
    Malformed(String),
}

/// Detects the encoding of an XML byte stream by inspecting the Byte Order Mark.
///
/// Returns a tuple of (encoding name, number of BOM bytes to skip).
///
/// # Examples
///
/// ```
/// use craftxml::encoding::detect_encoding;
///
/// let (enc, skip) = detect_encoding(b"\xEF\xBB\xBFhello");
/// assert_eq!(enc, "UTF-8");
/// assert_eq!(skip, 3);
///
/// let (enc, skip) = detect_encoding(b"<root/>");
/// assert_eq!(enc, "UTF-8");
/// assert_eq!(skip, 0);
/// ```
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> (&'static str, usize) {
    if bytes.starts_with(b"\xEF\xBB\xBF") {
        ("UTF-8", 3)
    } else if bytes.starts_with(b"\xFE\xFF") {
        ("UTF-16BE", 2)
    } else if bytes.starts_with(b"\xFF\xFE") {
        ("UTF-16LE", 2)
    } else {
        ("UTF-8", 0)
    }
}

/// Transcodes a byte slice from the named encoding into a UTF-8 `String`.
///
/// # Errors
///
/// Returns `EncodingError` if the encoding name is not recognized or if
/// the input contains malformed byte sequences.
///
/// # Examples
///
/// ```
/// use craftxml::encoding::transcode;
///
/// assert_eq!(transcode(b"caf\xE9", "ISO-8859-1").unwrap(), "caf\u{e9}");
/// ```
pub fn transcode(bytes: &[u8], encoding_name: &str) -> Result<String, EncodingError> {
    let encoding = Encoding::for_label(encoding_name.as_bytes())
        .ok_or_else(|| EncodingError::Unsupported(encoding_name.to_string()))?;

    let (result, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(EncodingError::Malformed(encoding_name.to_string()));
    }
    Ok(result.into_owned())
}

/// Reads `bytes` as windows-1252, which maps every byte to a character.
fn single_byte_fallback(bytes: &[u8]) -> String {
    WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned()
}

/// Decodes raw XML bytes into a UTF-8 string, detecting the encoding.
///
/// An unknown declared encoding is not an error: valid UTF-8 is then kept
/// as is and anything else is read as windows-1252.
///
/// # Errors
///
/// Returns `EncodingError` if the bytes are malformed for the encoding named
/// by their BOM or by their XML declaration.
///
/// # Examples
///
/// ```
/// use craftxml::encoding::decode_to_utf8;
///
/// let xml = b"<?xml version=\"1.0\"?><root/>";
/// let result = decode_to_utf8(xml).unwrap();
/// assert!(result.contains("<root/>"));
/// ```
pub fn decode_to_utf8(bytes: &[u8]) -> Result<String, EncodingError> {
    let (bom_encoding, bom_skip) = detect_encoding(bytes);
    let content_bytes = &bytes[bom_skip..];

    if bom_encoding != "UTF-8" {
        return transcode(content_bytes, bom_encoding);
    }

    let declared = extract_encoding_from_ascii_bytes(content_bytes)
        .filter(|label| !is_utf8_label(&label.to_ascii_uppercase()));
    let utf8 = std::str::from_utf8(content_bytes).ok();

    match (declared, utf8) {
        (None, Some(text)) => Ok(text.to_string()),
        (Some(label), utf8) => match transcode(content_bytes, &label) {
            Err(EncodingError::Unsupported(_)) => {
                log::warn!("unknown encoding {label:?}, falling back");
                Ok(utf8.map_or_else(|| single_byte_fallback(content_bytes), str::to_string))
            }
            result => result,
        },
        (None, None) => {
            log::warn!("input is not valid UTF-8, reading it as windows-1252");
            Ok(single_byte_fallback(content_bytes))
        }
    }
}

/// Extracts the `encoding` attribute from raw bytes by treating them as ASCII.
///
/// The XML declaration must be in ASCII-compatible characters, so the bytes
/// can be scanned directly. Returns `None` if no encoding declaration is found.
fn extract_encoding_from_ascii_bytes(bytes: &[u8]) -> Option<String> {
    let limit = bytes.len().min(200);
    let scan = &bytes[..limit];

    if !scan.starts_with(b"<?xml") {
        return None;
    }

    let decl_end = memmem::find(scan, b"?>")?;
    let decl = &scan[..decl_end];

    let enc_needle = b"encoding";
    let enc_pos = memmem::find(decl, enc_needle)?;
    let after_enc = skip_ascii_whitespace(&decl[enc_pos + enc_needle.len()..]);
    let after_eq = skip_ascii_whitespace(after_enc.strip_prefix(b"=")?);

    let quote = *after_eq.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let after_quote = &after_eq[1..];
    let end = memchr::memchr(quote, after_quote)?;
    let encoding_bytes = &after_quote[..end];

    if encoding_bytes.is_ascii() {
        Some(String::from_utf8_lossy(encoding_bytes).into_owned())
    } else {
        None
    }
}

/// Skips leading ASCII whitespace bytes (space, tab, CR, LF).
fn skip_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|&&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        .count();
    &bytes[skip..]
}

/// Returns `true` if the label is a recognized alias for UTF-8.
fn is_utf8_label(label: &str) -> bool {
    matches!(label, "UTF-8" | "UTF8")
}
