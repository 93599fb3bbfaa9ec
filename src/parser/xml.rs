//! Core XML parser state machine.
//!
//! A single forward-only cursor drives a loop over top-level markup and
//! character data. Open elements are tracked on an explicit tag stack with
//! `current` pointing at the innermost one, so nesting depth costs heap
//! rather than call stack. Each grammar unit has its own sub-parser that
//! either consumes its construct or returns the first error.

use memchr::memchr;

use crate::error::{ParseError, ParseStatus};
use crate::tree::{Document, NodeId, NodeType};

use super::entity::decode_text;
use super::input::{is_all_blank, is_blank, ParserInput};
use super::ParseFlags;

/// An attribute as read from a tag, before it is stored on a node.
struct ParsedAttribute {
    /// Offset of the first byte of the name.
    offset: usize,
    name: String,
    value: String,
}

/// The core XML parser.
pub(crate) struct XmlParser<'a> {
    /// Cursor over the input.
    input: ParserInput<'a>,
    /// The document being built.
    doc: Document,
    flags: ParseFlags,
    /// Names of the currently open elements, innermost last.
    tag_stack: Vec<String>,
    /// The node new children are appended to.
    current: NodeId,
    /// `true` until the first start tag.
    in_prolog: bool,
    seen_doctype: bool,
}

impl<'a> XmlParser<'a> {
    pub fn new(input: &'a str, flags: ParseFlags) -> Self {
        let doc = Document::new();
        let current = doc.root();
        Self {
            input: ParserInput::new(input),
            doc,
            flags,
            tag_stack: Vec::new(),
            current,
            in_prolog: true,
            seen_doctype: false,
        }
    }

    /// Consumes the parser, returning the tree built so far.
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Main parse entry point. Parses the entire input.
    pub fn parse(&mut self) -> Result<(), ParseError> {
        if self.looking_at_declaration() {
            self.parse_declaration()?;
        }

        while !self.input.at_end() {
            if self.input.peek() == Some(b'<') {
                self.parse_markup()?;
            } else {
                self.parse_char_data()?;
            }
        }

        if !self.tag_stack.is_empty() {
            return Err(self
                .input
                .error_at(ParseStatus::TagNotMatchedError, self.input.len()));
        }
        debug_assert_eq!(self.current, self.doc.root());
        Ok(())
    }

    /// Appends `node` to the current element if `flag` is enabled.
    fn retain(&mut self, flag: ParseFlags, node_type: NodeType, tag: String, content: String) {
        if self.flags.contains(flag) {
            let id = self.doc.create_node(node_type, tag, content);
            self.doc.append_child(self.current, id);
        }
    }

    /// Decodes references in `raw` (which starts at byte `start`) when
    /// reference decoding is enabled.
    fn decode(&self, raw: String, start: usize) -> Result<String, ParseError> {
        let has_reference = memchr(b'&', raw.as_bytes()).is_some();
        if !has_reference || !self.flags.contains(ParseFlags::ESCAPE_CHAR) {
            return Ok(raw);
        }
        let decoded = decode_text(&raw)
            .map_err(|i| self.input.error_at(ParseStatus::CharacterReferenceError, start + i))?;
        Ok(decoded.into_owned())
    }

    fn parse_markup(&mut self) -> Result<(), ParseError> {
        if self.input.looking_at(b"<!--") {
            self.parse_comment()
        } else if self.input.looking_at(b"<![CDATA[") && !self.tag_stack.is_empty() {
            self.parse_cdata()
        } else if self.input.looking_at_ci(b"<!DOCTYPE") {
            self.parse_doctype()
        } else if self.input.looking_at(b"<!") {
            let status = if self.in_prolog {
                ParseStatus::PrologSyntaxError
            } else {
                ParseStatus::TagSyntaxError
            };
            Err(self.input.error(status))
        } else if self.input.looking_at(b"<?") {
            self.parse_pi()
        } else if self.input.looking_at(b"</") {
            self.parse_end_tag()
        } else {
            self.parse_start_tag()
        }
    }

    // --- XML Declaration ---

    fn looking_at_declaration(&self) -> bool {
        self.input.pos() == 0
            && self.input.looking_at_ci(b"<?xml")
            && self
                .input
                .peek_at(5)
                .is_some_and(|b| is_blank(b) || b == b'?')
    }

    fn parse_declaration(&mut self) -> Result<(), ParseError> {
        let start = self.input.pos();
        self.input.advance(b"<?xml".len());

        let attributes = self.parse_attributes(b"?").map_err(|e| {
            self.input
                .error_at(ParseStatus::DeclarationSyntaxError, e.offset())
        })?;
        self.input.skip_blank();
        if !self.input.eat(b"?>") {
            return Err(self.input.error(ParseStatus::DeclarationSyntaxError));
        }

        let mut version = None;
        for attr in &attributes {
            match attr.name.as_str() {
                "version" => version = Some(attr.value.clone()),
                "encoding" => self.doc.encoding = Some(attr.value.clone()),
                "standalone" => {
                    self.doc.standalone = match attr.value.as_str() {
                        "yes" => Some(true),
                        "no" => Some(false),
                        _ => {
                            return Err(self
                                .input
                                .error_at(ParseStatus::DeclarationSyntaxError, attr.offset))
                        }
                    };
                }
                _ => {}
            }
        }
        if version.is_none() {
            return Err(self
                .input
                .error_at(ParseStatus::DeclarationSyntaxError, start));
        }
        self.doc.version = version;
        log::trace!(
            "XML declaration: version={:?} encoding={:?} standalone={:?}",
            self.doc.version,
            self.doc.encoding,
            self.doc.standalone
        );

        if self.flags.contains(ParseFlags::DECLARATION) {
            let id = self
                .doc
                .create_node(NodeType::Declaration, String::new(), String::new());
            for attr in attributes {
                self.doc.set_attribute(id, attr.name, attr.value);
            }
            self.doc.append_child(self.current, id);
        }
        Ok(())
    }

    // --- DOCTYPE Declaration ---

    fn parse_doctype(&mut self) -> Result<(), ParseError> {
        let start = self.input.pos();
        if self.seen_doctype || !self.in_prolog {
            return Err(self.input.error(ParseStatus::DoctypeSyntaxError));
        }
        self.input.advance(b"<!DOCTYPE".len());
        let body_start = self.input.pos();

        // Brackets open and close the internal subset. Quotes delimit
        // literals only in the external ID and inside `<!...>` declarations;
        // comments and PIs in the subset are skipped whole.
        let mut depth: u32 = 0;
        let mut in_declaration = false;
        let body_end = loop {
            let Some(b) = self.input.peek() else {
                return Err(self
                    .input
                    .error_at(ParseStatus::DoctypeSyntaxError, start));
            };
            match b {
                b'"' | b'\'' if depth == 0 || in_declaration => {
                    self.input.advance(1);
                    let close = self
                        .input
                        .find(&[b])
                        .ok_or_else(|| {
                            self.input.error_at(ParseStatus::DoctypeSyntaxError, start)
                        })?;
                    self.input.seek(close);
                }
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if in_declaration => in_declaration = false,
                b'>' if depth == 0 => break self.input.pos(),
                b'<' if depth > 0 && self.input.looking_at(b"<!--") => {
                    self.input.advance(b"<!--".len());
                    let close = self
                        .input
                        .find(b"-->")
                        .ok_or_else(|| {
                            self.input.error_at(ParseStatus::DoctypeSyntaxError, start)
                        })?;
                    self.input.seek(close + 2);
                }
                b'<' if depth > 0 && self.input.looking_at(b"<?") => {
                    self.input.advance(b"<?".len());
                    let close = self
                        .input
                        .find(b"?>")
                        .ok_or_else(|| {
                            self.input.error_at(ParseStatus::DoctypeSyntaxError, start)
                        })?;
                    self.input.seek(close + 1);
                }
                b'<' if depth > 0 && self.input.looking_at(b"<!") => in_declaration = true,
                _ => {}
            }
            self.input.advance(1);
        };
        self.input.advance(1);
        self.seen_doctype = true;

        let content = self.input.text(body_start, body_end).trim().to_string();
        log::trace!("DOCTYPE at byte {start}: {content:?}");
        self.retain(ParseFlags::DOCTYPE, NodeType::Doctype, String::new(), content);
        Ok(())
    }

    // --- Elements ---

    fn parse_start_tag(&mut self) -> Result<(), ParseError> {
        self.input.advance(1);
        let name_start = self.input.pos();
        let name = self.input.parse_name();
        if name.is_empty() {
            return Err(self
                .input
                .error_at(ParseStatus::TagSyntaxError, name_start));
        }
        match self.input.peek() {
            None => return Err(self.input.error(ParseStatus::TagBadCloseError)),
            Some(b) if is_blank(b) || b == b'/' || b == b'>' => {}
            Some(_) => return Err(self.input.error(ParseStatus::TagSyntaxError)),
        }

        let attributes = self.parse_attributes(b"/>")?;
        let empty = if self.input.eat(b"/>") {
            true
        } else if self.input.eat(b">") {
            false
        } else {
            return Err(self.input.error(ParseStatus::TagBadCloseError));
        };

        if self.in_prolog {
            log::trace!("prolog ends at <{name}>");
            self.in_prolog = false;
        }
        let id = self
            .doc
            .create_node(NodeType::Element, name.as_str(), String::new());
        for attr in attributes {
            self.doc.set_attribute(id, attr.name, attr.value);
        }
        self.doc.append_child(self.current, id);
        if !empty {
            self.tag_stack.push(name);
            self.current = id;
        }
        Ok(())
    }

    fn parse_end_tag(&mut self) -> Result<(), ParseError> {
        self.input.advance(2);
        self.input.skip_blank();
        let name_start = self.input.pos();
        let name = self.input.parse_name();

        if self.tag_stack.last() != Some(&name) {
            return Err(self
                .input
                .error_at(ParseStatus::TagNotMatchedError, name_start));
        }
        self.input.skip_blank();
        if !self.input.eat(b">") {
            return Err(self.input.error(ParseStatus::TagBadCloseError));
        }

        self.tag_stack.pop();
        self.current = self.doc.parent(self.current);
        Ok(())
    }

    // --- Attributes ---

    /// Reads attributes until end of input or a byte in `terminators`.
    fn parse_attributes(
        &mut self,
        terminators: &[u8],
    ) -> Result<Vec<ParsedAttribute>, ParseError> {
        let mut attributes: Vec<ParsedAttribute> = Vec::new();
        loop {
            self.input.skip_blank();
            match self.input.peek() {
                None => break,
                Some(b) if terminators.contains(&b) => break,
                Some(_) => {}
            }

            let offset = self.input.pos();
            let name = self.input.parse_name();
            if name.is_empty() {
                return Err(self.input.error(ParseStatus::AttributeSyntaxError));
            }
            if attributes.iter().any(|a| a.name == name) {
                return Err(self
                    .input
                    .error_at(ParseStatus::AttributeRepeatError, offset));
            }

            self.input.skip_blank();
            if !self.input.eat(b"=") {
                return Err(self.input.error(ParseStatus::AttributeSyntaxError));
            }
            self.input.skip_blank();
            let quote = match self.input.peek() {
                Some(q @ (b'"' | b'\'')) => q,
                _ => return Err(self.input.error(ParseStatus::AttributeSyntaxError)),
            };
            let quote_pos = self.input.pos();
            self.input.advance(1);
            let value_start = self.input.pos();
            let value_end = self.input.find(&[quote]).ok_or_else(|| {
                self.input
                    .error_at(ParseStatus::AttributeSyntaxError, quote_pos)
            })?;
            let raw = self.input.text(value_start, value_end);
            self.input.seek(value_end + 1);

            let value = self.decode(raw, value_start)?;
            attributes.push(ParsedAttribute {
                offset,
                name,
                value,
            });

            // Consecutive attributes must be separated by blanks.
            if self
                .input
                .peek()
                .is_some_and(|b| !is_blank(b) && !terminators.contains(&b))
            {
                return Err(self.input.error(ParseStatus::TagBadCloseError));
            }
        }
        Ok(attributes)
    }

    // --- Character Data ---

    fn parse_char_data(&mut self) -> Result<(), ParseError> {
        let start = self.input.pos();
        let end = self.input.find(b"<").unwrap_or(self.input.len());
        let raw = self.input.text(start, end);

        if self.tag_stack.is_empty() {
            if let Some(i) = raw.bytes().position(|b| !is_blank(b)) {
                return Err(self
                    .input
                    .error_at(ParseStatus::TagSyntaxError, start + i));
            }
            self.input.seek(end);
            return Ok(());
        }

        let content = if self.flags.contains(ParseFlags::MERGE_BLANK) && is_all_blank(&raw) {
            String::new()
        } else {
            self.decode(raw, start)?
        };
        self.input.seek(end);

        if self.flags.contains(ParseFlags::DATA_TO_PARENT)
            && self.doc.node_type(self.current) == NodeType::Element
            && self.doc.content(self.current).is_empty()
        {
            self.doc.set_content(self.current, content.as_str());
        }
        let id = self.doc.create_node(NodeType::Data, String::new(), content);
        self.doc.append_child(self.current, id);
        Ok(())
    }

    // --- Comments ---

    fn parse_comment(&mut self) -> Result<(), ParseError> {
        let start = self.input.pos();
        self.input.advance(b"<!--".len());
        let body_start = self.input.pos();

        let dashes = self
            .input
            .find(b"--")
            .ok_or_else(|| self.input.error_at(ParseStatus::CommentSyntaxError, start))?;
        self.input.seek(dashes);
        if self.input.peek_at(2) != Some(b'>') {
            return Err(self.input.error(ParseStatus::CommentSyntaxError));
        }
        let content = self.input.text(body_start, dashes);
        self.input.advance(3);

        self.retain(ParseFlags::COMMENT, NodeType::Comment, String::new(), content);
        Ok(())
    }

    // --- CDATA Sections ---

    fn parse_cdata(&mut self) -> Result<(), ParseError> {
        let start = self.input.pos();
        self.input.advance(b"<![CDATA[".len());
        let body_start = self.input.pos();

        let end = self
            .input
            .find(b"]]>")
            .ok_or_else(|| self.input.error_at(ParseStatus::CDATASyntaxError, start))?;
        let content = self.input.text(body_start, end);
        self.input.seek(end + 3);

        self.retain(ParseFlags::CDATA, NodeType::CData, String::new(), content);
        Ok(())
    }

    // --- Processing Instructions ---

    fn parse_pi(&mut self) -> Result<(), ParseError> {
        let start = self.input.pos();
        self.input.advance(2);
        let target = self.input.parse_name();
        if target.is_empty() {
            return Err(self.input.error(ParseStatus::PISyntaxError));
        }
        if target.eq_ignore_ascii_case("xml") {
            return Err(self
                .input
                .error_at(ParseStatus::DeclarationPositionError, start));
        }
        if self.input.peek().is_some_and(|b| !is_blank(b) && b != b'?') {
            return Err(self.input.error(ParseStatus::PISyntaxError));
        }

        let end = self
            .input
            .find(b"?>")
            .ok_or_else(|| self.input.error_at(ParseStatus::PISyntaxError, start))?;
        self.input.skip_blank();
        let content = self.input.text(self.input.pos(), end);
        self.input.seek(end + 2);

        self.retain(ParseFlags::PI, NodeType::ProcessingInstruction, target, content);
        Ok(())
    }
}
