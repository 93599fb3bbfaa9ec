//! Low-level input handling for the XML parser.
//!
//! [`ParserInput`] wraps the immutable input buffer and a forward-only byte
//! offset, and provides the scanning primitives every grammar unit is built
//! from: peeking, blank skipping, name scanning, literal lookahead and
//! terminator search.

use memchr::memmem;

use crate::error::{ParseError, ParseStatus};

/// Bytes that end a name, besides blanks.
const NAME_DELIMITERS: &[u8] = b"!\"#$%&'()*+,/;<=>?@[\\]^`{|}~";

/// Returns `true` for the XML blank characters: space, tab, CR and LF.
pub(crate) fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Returns `true` if `b` may appear in a name.
///
/// Names are delimiter-bounded: anything that is neither a blank nor one of
/// the ASCII punctuation delimiters counts, including every non-ASCII byte.
pub(crate) fn is_name_byte(b: u8) -> bool {
    !is_blank(b) && !NAME_DELIMITERS.contains(&b)
}

/// Returns `true` if every byte of `s` is blank (vacuously true when empty).
pub(crate) fn is_all_blank(s: &str) -> bool {
    s.bytes().all(is_blank)
}

/// The input buffer and the parser's current position in it.
pub(crate) struct ParserInput<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> ParserInput<'a> {
    /// Creates a `ParserInput` positioned at offset 0.
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    // -- Position queries --

    /// Returns `true` if all input has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns the current byte offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the total input length in bytes.
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// Returns the remaining input bytes from the current position.
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos.min(self.input.len())..]
    }

    /// Returns the text between two byte offsets.
    ///
    /// Both offsets always fall on ASCII delimiters in practice, so the
    /// slice is valid UTF-8; a lossy conversion guards the general case.
    pub fn text(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.input[start..end]).into_owned()
    }

    // -- Peek / advance --

    /// Returns the byte at the current position without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Returns the byte at `current_position + offset` without consuming.
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Advances the position by `count` bytes, stopping at end of input.
    pub fn advance(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.input.len());
    }

    /// Moves the position to `pos`, which must not be behind the cursor.
    pub fn seek(&mut self, pos: usize) {
        debug_assert!(pos >= self.pos, "the cursor only moves forward");
        self.pos = pos.min(self.input.len());
    }

    // -- Lookahead --

    /// Returns `true` if the remaining input starts with `s`.
    pub fn looking_at(&self, s: &[u8]) -> bool {
        self.remaining().starts_with(s)
    }

    /// Case-insensitive (ASCII) variant of [`looking_at`](Self::looking_at).
    pub fn looking_at_ci(&self, s: &[u8]) -> bool {
        let rest = self.remaining();
        rest.len() >= s.len() && rest[..s.len()].eq_ignore_ascii_case(s)
    }

    /// Consumes `s` if the remaining input starts with it.
    pub fn eat(&mut self, s: &[u8]) -> bool {
        if self.looking_at(s) {
            self.advance(s.len());
            true
        } else {
            false
        }
    }

    /// Returns the absolute offset of the next occurrence of `needle` at or
    /// after the cursor, without moving.
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(self.remaining(), needle).map(|i| self.pos + i)
    }

    // -- Blanks --

    /// Skips blank characters. Returns `true` if any were consumed.
    pub fn skip_blank(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(is_blank) {
            self.pos += 1;
        }
        self.pos > start
    }

    // -- Names --

    /// Scans the longest run of name bytes and returns it. The result is
    /// empty if the cursor is not on a name byte.
    pub fn parse_name(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        self.text(start, self.pos)
    }

    // -- Errors --

    /// Builds a `ParseError` at `offset`.
    pub fn error_at(&self, status: ParseStatus, offset: usize) -> ParseError {
        ParseError::at(status, self.input, offset)
    }

    /// Builds a `ParseError` at the current position.
    pub fn error(&self, status: ParseStatus) -> ParseError {
        self.error_at(status, self.pos)
    }
}
