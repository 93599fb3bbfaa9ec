//! XML parser.
//!
//! A hand-rolled recursive descent parser for a practical subset of XML 1.0:
//! the XML declaration, elements and attributes, character and entity
//! references, comments, CDATA sections, processing instructions and
//! DOCTYPE declarations (kept as raw text). It builds a [`Document`] tree
//! and stops at the first error, reporting its status and byte offset.
//!
//! [`ParseFlags`] select which optional node kinds are kept in the tree and
//! how text is post-processed; they never change what input is accepted.

mod entity;
pub(crate) mod input;
mod xml;

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::path::Path;

use crate::encoding::decode_to_utf8;
use crate::error::{ParseError, ParseStatus, SourceLocation};
use crate::tree::Document;

/// A set of parse flags.
///
/// Flags combine with `|`:
///
/// ```
/// use craftxml::ParseFlags;
///
/// let flags = ParseFlags::COMMENT | ParseFlags::ESCAPE_CHAR;
/// assert!(flags.contains(ParseFlags::COMMENT));
/// assert!(!flags.contains(ParseFlags::CDATA));
///
/// let flags = ParseFlags::FULL.merge_blank(true).comment(false);
/// assert!(flags.contains(ParseFlags::MERGE_BLANK));
/// assert!(!flags.contains(ParseFlags::COMMENT));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseFlags(u32);

impl ParseFlags {
    /// Keep only the document, element and text nodes; decode nothing.
    pub const MINIMAL: Self = Self(0);
    /// Keep the XML declaration node.
    pub const DECLARATION: Self = Self(1);
    /// Keep comment nodes.
    pub const COMMENT: Self = Self(1 << 1);
    /// Keep processing instruction nodes.
    pub const PI: Self = Self(1 << 2);
    /// Keep CDATA section nodes.
    pub const CDATA: Self = Self(1 << 3);
    /// Decode character and entity references in text and attribute values.
    /// When unset, `&...;` passes through literally.
    pub const ESCAPE_CHAR: Self = Self(1 << 4);
    /// Keep the DOCTYPE node.
    pub const DOCTYPE: Self = Self(1 << 5);
    /// Collapse text runs made only of blanks to empty content.
    pub const MERGE_BLANK: Self = Self(1 << 6);
    /// Mirror the first text child of an element onto the element's own
    /// content, e.g. `<a>text</a>` gives `a` the content `"text"`.
    pub const DATA_TO_PARENT: Self = Self(1 << 7);
    /// Everything except [`MERGE_BLANK`](Self::MERGE_BLANK). The default.
    pub const FULL: Self = Self(
        Self::DECLARATION.0
            | Self::COMMENT.0
            | Self::PI.0
            | Self::CDATA.0
            | Self::ESCAPE_CHAR.0
            | Self::DOCTYPE.0
            | Self::DATA_TO_PARENT.0,
    );

    /// Builds flags from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns a copy with the bits of `flag` set or cleared.
    #[must_use]
    pub const fn set(self, flag: Self, yes: bool) -> Self {
        if yes {
            Self(self.0 | flag.0)
        } else {
            Self(self.0 & !flag.0)
        }
    }

    /// Enables or disables keeping the XML declaration node.
    #[must_use]
    pub fn declaration(self, yes: bool) -> Self {
        self.set(Self::DECLARATION, yes)
    }

    /// Enables or disables keeping comment nodes.
    #[must_use]
    pub fn comment(self, yes: bool) -> Self {
        self.set(Self::COMMENT, yes)
    }

    /// Enables or disables keeping processing instruction nodes.
    #[must_use]
    pub fn pi(self, yes: bool) -> Self {
        self.set(Self::PI, yes)
    }

    /// Enables or disables keeping CDATA nodes.
    #[must_use]
    pub fn cdata(self, yes: bool) -> Self {
        self.set(Self::CDATA, yes)
    }

    /// Enables or disables reference decoding.
    #[must_use]
    pub fn escape_char(self, yes: bool) -> Self {
        self.set(Self::ESCAPE_CHAR, yes)
    }

    /// Enables or disables keeping the DOCTYPE node.
    #[must_use]
    pub fn doctype(self, yes: bool) -> Self {
        self.set(Self::DOCTYPE, yes)
    }

    /// Enables or disables blank-run merging.
    #[must_use]
    pub fn merge_blank(self, yes: bool) -> Self {
        self.set(Self::MERGE_BLANK, yes)
    }

    /// Enables or disables mirroring text onto the parent element.
    #[must_use]
    pub fn data_to_parent(self, yes: bool) -> Self {
        self.set(Self::DATA_TO_PARENT, yes)
    }
}

impl Default for ParseFlags {
    fn default() -> Self {
        Self::FULL
    }
}

impl BitOr for ParseFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ParseFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ParseFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ParseFlags, &str); 8] = [
            (ParseFlags::DECLARATION, "DECLARATION"),
            (ParseFlags::COMMENT, "COMMENT"),
            (ParseFlags::PI, "PI"),
            (ParseFlags::CDATA, "CDATA"),
            (ParseFlags::ESCAPE_CHAR, "ESCAPE_CHAR"),
            (ParseFlags::DOCTYPE, "DOCTYPE"),
            (ParseFlags::MERGE_BLANK, "MERGE_BLANK"),
            (ParseFlags::DATA_TO_PARENT, "DATA_TO_PARENT"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            f.write_str("ParseFlags(MINIMAL)")
        } else {
            write!(f, "ParseFlags({})", set.join(" | "))
        }
    }
}

/// The result of a load call: the (possibly partial) tree plus the status
/// and byte offset of the first failure.
///
/// When `status` is not [`ParseStatus::NoError`] the shape of `document` is
/// whatever had been built before the error.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// The parsed tree.
    pub document: Document,
    /// [`ParseStatus::NoError`] or the first failure.
    pub status: ParseStatus,
    /// Byte offset of the failing construct; 0 on success.
    pub offset: usize,
    /// Line and column of `offset`.
    pub location: SourceLocation,
}

impl LoadOutcome {
    fn new(document: Document, result: Result<(), ParseError>) -> Self {
        match result {
            Ok(()) => Self {
                document,
                status: ParseStatus::NoError,
                offset: 0,
                location: SourceLocation::default(),
            },
            Err(err) => Self::failed(document, &err),
        }
    }

    fn failed(document: Document, err: &ParseError) -> Self {
        Self {
            document,
            status: err.status,
            offset: err.offset(),
            location: err.location,
        }
    }

    /// Returns `true` if the document parsed without error.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Returns the error, if any.
    #[must_use]
    pub fn error(&self) -> Option<ParseError> {
        if self.is_ok() {
            None
        } else {
            Some(ParseError {
                status: self.status,
                location: self.location,
            })
        }
    }

    /// Converts into a `Result`, dropping the partial tree on failure.
    ///
    /// # Errors
    ///
    /// Returns the first parse failure.
    pub fn into_result(self) -> Result<Document, ParseError> {
        match self.error() {
            None => Ok(self.document),
            Some(err) => Err(err),
        }
    }
}

/// Parses an XML string with [`ParseFlags::FULL`].
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed.
pub fn parse_str(input: &str) -> Result<Document, ParseError> {
    parse_str_with_flags(input, ParseFlags::FULL)
}

/// Parses an XML string with the given flags.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed.
pub fn parse_str_with_flags(input: &str, flags: ParseFlags) -> Result<Document, ParseError> {
    load_str(input, flags).into_result()
}

/// Parses an XML string, keeping the partial tree on failure.
#[must_use]
pub fn load_str(input: &str, flags: ParseFlags) -> LoadOutcome {
    let mut parser = xml::XmlParser::new(input, flags);
    let result = parser.parse();
    let document = parser.into_document();
    match &result {
        Ok(()) => log::debug!(
            "parsed {} bytes into {} nodes",
            input.len(),
            document.node_count()
        ),
        Err(err) => log::debug!("parse stopped: {err}"),
    }
    LoadOutcome::new(document, result)
}

/// Decodes `bytes` to text and parses it.
///
/// Byte offsets in the outcome refer to the decoded text.
#[must_use]
pub fn load_bytes(bytes: &[u8], flags: ParseFlags) -> LoadOutcome {
    match decode_to_utf8(bytes) {
        Ok(text) => load_str(&text, flags),
        Err(err) => {
            log::warn!("cannot decode input: {err}");
            LoadOutcome::failed(
                Document::new(),
                &ParseError::at(ParseStatus::DeclarationSyntaxError, bytes, 0),
            )
        }
    }
}

/// Reads the whole file at `path` and parses it.
#[must_use]
pub fn load_file(path: &Path, flags: ParseFlags) -> LoadOutcome {
    match std::fs::read(path) {
        Ok(bytes) => load_bytes(&bytes, flags),
        Err(err) => {
            log::warn!("cannot read {}: {err}", path.display());
            LoadOutcome::failed(
                Document::new(),
                &ParseError::at(ParseStatus::FileOpenFailed, &[], 0),
            )
        }
    }
}
