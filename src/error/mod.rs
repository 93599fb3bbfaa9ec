//! Error types and diagnostics for XML parsing.
//!
//! Every failure is reported as a [`ParseStatus`] paired with the position of
//! the construct that failed. Parsing stops at the first failure; there is no
//! recovery mode, so a `ParseError` is always terminal for the call that
//! produced it.

use std::fmt;

use thiserror::Error;

/// Outcome of a load call.
///
/// `NoError` is only ever seen on a [`LoadOutcome`](crate::parser::LoadOutcome);
/// a [`ParseError`] always carries one of the failure variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseStatus {
    /// The document parsed completely.
    #[default]
    NoError,
    /// The input file could not be opened or read.
    FileOpenFailed,
    /// Malformed tag name, stray `<!`, or character data outside any element.
    TagSyntaxError,
    /// A tag is not closed by `>` or `/>`.
    TagBadCloseError,
    /// A comment contains `--` before its terminator or is never terminated.
    CommentSyntaxError,
    /// An end tag does not match the innermost open element, or elements
    /// are still open at end of input.
    TagNotMatchedError,
    /// An attribute is missing `=`, has an unquoted or unterminated value,
    /// or has an empty name.
    AttributeSyntaxError,
    /// The same attribute name appears twice within one tag.
    AttributeRepeatError,
    /// The XML declaration lacks `version`, has a bad `standalone` value,
    /// or is not closed by `?>`.
    DeclarationSyntaxError,
    /// A processing instruction targets `xml` anywhere but offset 0.
    DeclarationPositionError,
    /// A CDATA section is never terminated by `]]>`.
    CDATASyntaxError,
    /// A processing instruction has a bad target or no `?>`.
    PISyntaxError,
    /// Unrecognized markup before the first element.
    PrologSyntaxError,
    /// A DOCTYPE is unterminated, repeated, or outside the prolog.
    DoctypeSyntaxError,
    /// An `&...;` reference could not be decoded.
    CharacterReferenceError,
}

impl ParseStatus {
    /// Returns the status name, e.g. `"TagSyntaxError"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoError => "NoError",
            Self::FileOpenFailed => "FileOpenFailed",
            Self::TagSyntaxError => "TagSyntaxError",
            Self::TagBadCloseError => "TagBadCloseError",
            Self::CommentSyntaxError => "CommentSyntaxError",
            Self::TagNotMatchedError => "TagNotMatchedError",
            Self::AttributeSyntaxError => "AttributeSyntaxError",
            Self::AttributeRepeatError => "AttributeRepeatError",
            Self::DeclarationSyntaxError => "DeclarationSyntaxError",
            Self::DeclarationPositionError => "DeclarationPositionError",
            Self::CDATASyntaxError => "CDATASyntaxError",
            Self::PISyntaxError => "PISyntaxError",
            Self::PrologSyntaxError => "PrologSyntaxError",
            Self::DoctypeSyntaxError => "DoctypeSyntaxError",
            Self::CharacterReferenceError => "CharacterReferenceError",
        }
    }

    /// Returns `true` for [`ParseStatus::NoError`].
    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Self::NoError
    }
}

impl fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source location within an XML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl SourceLocation {
    /// Computes the line and column of `byte_offset` within `input`.
    ///
    /// Offsets past the end of `input` are clamped for the line/column
    /// computation but reported unchanged.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn locate(input: &[u8], byte_offset: usize) -> Self {
        let prefix = &input[..byte_offset.min(input.len())];
        let line = memchr::memchr_iter(b'\n', prefix).count() + 1;
        let line_start = memchr::memrchr(b'\n', prefix).map_or(0, |p| p + 1);
        Self {
            line: line as u32,
            column: (prefix.len() - line_start + 1) as u32,
            byte_offset,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The error type returned when XML parsing fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status} at {location} (byte {})", .location.byte_offset)]
pub struct ParseError {
    /// What went wrong. Never [`ParseStatus::NoError`].
    pub status: ParseStatus,
    /// Where in the source the failing construct starts.
    pub location: SourceLocation,
}

impl ParseError {
    /// Creates an error for `status` at `byte_offset` within `input`.
    #[must_use]
    pub fn at(status: ParseStatus, input: &[u8], byte_offset: usize) -> Self {
        debug_assert!(!status.is_ok(), "ParseError cannot carry NoError");
        Self {
            status,
            location: SourceLocation::locate(input, byte_offset),
        }
    }

    /// Returns the 0-based byte offset of the failing construct.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.location.byte_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation {
            line: 10,
            column: 5,
            byte_offset: 42,
        };
        assert_eq!(loc.to_string(), "10:5");
    }

    #[test]
    fn test_locate_first_line() {
        let loc = SourceLocation::locate(b"<a></b>", 5);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 6);
        assert_eq!(loc.byte_offset, 5);
    }

    #[test]
    fn test_locate_after_newlines() {
        let loc = SourceLocation::locate(b"<a>\n  <b>\n</a>", 12);
        assert_eq!(loc.line, 3);
        assert_eq!(loc.column, 3);
    }

    #[test]
    fn test_locate_past_end_keeps_offset() {
        let loc = SourceLocation::locate(b"<a>", 10);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 4);
        assert_eq!(loc.byte_offset, 10);
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::at(ParseStatus::TagNotMatchedError, b"<a></b>", 5);
        assert_eq!(err.to_string(), "TagNotMatchedError at 1:6 (byte 5)");
        assert_eq!(err.offset(), 5);
    }

    #[test]
    fn test_status_names() {
        assert_eq!(ParseStatus::NoError.to_string(), "NoError");
        assert_eq!(ParseStatus::CDATASyntaxError.to_string(), "CDATASyntaxError");
        assert_eq!(
            ParseStatus::CharacterReferenceError.to_string(),
            "CharacterReferenceError"
        );
        assert_eq!(ParseStatus::default(), ParseStatus::NoError);
        assert!(ParseStatus::NoError.is_ok());
        assert!(!ParseStatus::PISyntaxError.is_ok());
    }

    #[test]
    fn test_parse_error_is_error_trait() {
        let err = ParseError::at(ParseStatus::PISyntaxError, b"<?", 0);
        let _: &dyn std::error::Error = &err;
    }
}
