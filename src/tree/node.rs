//! Node type definitions.
//!
//! Every node carries the same flat payload (tag, content, attributes); the
//! [`NodeType`] says which of those fields are meaningful. Navigation links
//! are plain arena indices, so the tree holds no reference cycles.

use std::collections::BTreeMap;

use super::NodeId;

/// The kind of an XML node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// The document node. There is exactly one per `Document`.
    Document,
    /// An element, e.g. `<div class="x">`.
    Element,
    /// Character data between tags.
    Data,
    /// A CDATA section, e.g. `<![CDATA[...]]>`.
    CData,
    /// A comment, e.g. `<!-- ... -->`.
    Comment,
    /// A document type declaration, e.g. `<!DOCTYPE html>`.
    ///
    /// The content is the text between `<!DOCTYPE` and the closing `>`,
    /// internal subset included, with leading and trailing whitespace
    /// trimmed: `<!DOCTYPE  a [ ... ]  >` stores `a [ ... ]`.
    Doctype,
    /// The XML declaration, e.g. `<?xml version="1.0"?>`.
    Declaration,
    /// A processing instruction, e.g. `<?target data?>`.
    ProcessingInstruction,
    /// The absent node returned by navigation and search when nothing is
    /// found. It is never produced by the parser.
    Null,
}

/// Storage for a single node in the document arena.
///
/// Children are owned through the ordered `children` list; `parent`,
/// `prev_sibling` and `next_sibling` are back/side references kept for O(1)
/// traversal and are [`NodeId::NULL`] when absent.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// What kind of node this is.
    pub node_type: NodeType,
    /// Element name, or PI target. Empty for other kinds.
    pub tag: String,
    /// Text payload: character data, comment/CDATA text, PI body, or the raw
    /// DOCTYPE text. Elements may mirror their first text child here.
    pub content: String,
    /// Attributes of elements and of the XML declaration.
    pub attributes: BTreeMap<String, String>,
    pub(crate) parent: NodeId,
    pub(crate) prev_sibling: NodeId,
    pub(crate) next_sibling: NodeId,
    pub(crate) children: Vec<NodeId>,
}

impl NodeData {
    pub(crate) fn new(node_type: NodeType, tag: String, content: String) -> Self {
        Self {
            node_type,
            tag,
            content,
            attributes: BTreeMap::new(),
            parent: NodeId::NULL,
            prev_sibling: NodeId::NULL,
            next_sibling: NodeId::NULL,
            children: Vec::new(),
        }
    }

    /// Returns the child handles in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
