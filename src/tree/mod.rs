//! Arena-based XML document tree.
//!
//! All nodes live in a contiguous `Vec<NodeData>` owned by the [`Document`]
//! and are referenced by [`NodeId`], a plain index. Index 0 is the permanent
//! `Null` node: navigation and search return [`NodeId::NULL`] instead of
//! failing when nothing is there.
//!
//! # Architecture
//!
//! Each node owns an ordered list of its children's handles. Parent and
//! sibling links are non-owning indices used only for traversal, so the
//! tree has no reference cycles and dropping the `Document` frees every
//! node at once. Appending a child is O(1) and the end of a child list is
//! simply the end of the `Vec`.

mod node;

pub use node::{NodeData, NodeType};

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ParseError;
use crate::parser::{self, LoadOutcome, ParseFlags};

/// A typed index into the document's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The handle of the `Null` node.
    pub const NULL: NodeId = NodeId(0);

    #[allow(clippy::cast_possible_truncation)]
    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    fn as_index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this is the handle of the `Null` node.
    #[must_use]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns `Some(self)` unless this is the `Null` handle.
    #[must_use]
    pub fn non_null(self) -> Option<Self> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }
}

/// An XML document.
///
/// The `Document` owns all nodes in an arena and provides methods for
/// tree navigation and mutation. All tree operations go through
/// `&Document` (navigation) or `&mut Document` (mutation).
///
/// # Examples
///
/// ```
/// use craftxml::{Document, ParseFlags, ParseStatus};
///
/// let outcome = Document::load_str("<tag>content</tag>", ParseFlags::FULL);
/// assert_eq!(outcome.status, ParseStatus::NoError);
///
/// let doc = outcome.document;
/// let tag = doc.find_first_child_by_tag_name(doc.root(), "tag");
/// assert_eq!(doc.content(tag), "content");
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    /// The node arena. Index 0 is the `Null` node.
    nodes: Vec<NodeData>,
    /// The document root node id (the Document node, not the root element).
    root: NodeId,
    /// XML version from the XML declaration (e.g., "1.0").
    pub version: Option<String>,
    /// Encoding from the XML declaration (e.g., "UTF-8").
    pub encoding: Option<String>,
    /// Standalone flag from the XML declaration.
    pub standalone: Option<bool>,
}

impl Document {
    /// Creates a new empty document.
    ///
    /// The document contains the `Null` node and a single root Document node.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(NodeData::new(NodeType::Null, String::new(), String::new()));
        nodes.push(NodeData::new(
            NodeType::Document,
            String::new(),
            String::new(),
        ));
        Self {
            nodes,
            root: NodeId::from_index(1),
            version: None,
            encoding: None,
            standalone: None,
        }
    }

    /// Parses `input` with `flags`, returning the tree together with the
    /// status and offset of the first failure.
    ///
    /// Malformed input never panics; on failure the returned tree holds
    /// whatever was built before the error.
    #[must_use]
    pub fn load_str(input: &str, flags: ParseFlags) -> LoadOutcome {
        parser::load_str(input, flags)
    }

    /// Decodes `bytes` (UTF-8 or a single-byte encoding) and parses them.
    #[must_use]
    pub fn load_bytes(bytes: &[u8], flags: ParseFlags) -> LoadOutcome {
        parser::load_bytes(bytes, flags)
    }

    /// Reads the whole file at `path` and parses it.
    ///
    /// A file that cannot be opened or read yields
    /// [`ParseStatus::FileOpenFailed`](crate::ParseStatus::FileOpenFailed)
    /// and an empty document.
    #[must_use]
    pub fn load_file(path: impl AsRef<Path>, flags: ParseFlags) -> LoadOutcome {
        parser::load_file(path.as_ref(), flags)
    }

    /// Parses an XML string with [`ParseFlags::FULL`].
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the input is not well-formed.
    ///
    /// # Examples
    ///
    /// ```
    /// use craftxml::Document;
    ///
    /// let doc = Document::parse_str("<root><child/></root>").unwrap();
    /// assert_eq!(doc.tag(doc.root_element()), "root");
    /// ```
    pub fn parse_str(input: &str) -> Result<Self, ParseError> {
        parser::parse_str(input)
    }

    /// Returns the document root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the first element child of the document node, or
    /// [`NodeId::NULL`] if there is none.
    #[must_use]
    pub fn root_element(&self) -> NodeId {
        self.find_first_child_by_type(self.root, NodeType::Element)
    }

    /// Returns a reference to the `NodeData` for the given node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a node of this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    // --- Accessors ---

    /// Returns the kind of a node.
    #[must_use]
    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.node(id).node_type
    }

    /// Returns the tag of an element (or the target of a PI).
    #[must_use]
    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag
    }

    /// Returns the content of a node.
    #[must_use]
    pub fn content(&self, id: NodeId) -> &str {
        &self.node(id).content
    }

    /// Returns the string value of a node, which is its content.
    #[must_use]
    pub fn string_value(&self, id: NodeId) -> &str {
        self.content(id)
    }

    /// Returns the attributes of a node.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &BTreeMap<String, String> {
        &self.node(id).attributes
    }

    /// Returns the value of an attribute by name.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attributes.get(name).map(String::as_str)
    }

    /// Returns the concatenated text of all `Data` and `CData` nodes at or
    /// below `id`, in document order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.collect_text(id, &mut result);
        result
    }

    fn collect_text(&self, id: NodeId, buf: &mut String) {
        let node = self.node(id);
        match node.node_type {
            NodeType::Data | NodeType::CData => buf.push_str(&node.content),
            _ => {
                for &child in &node.children {
                    self.collect_text(child, buf);
                }
            }
        }
    }

    // --- Navigation ---

    /// Returns the parent of a node, or `NULL` for the document root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.node(id).parent
    }

    /// Returns the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> NodeId {
        self.node(id).children.first().copied().unwrap_or(NodeId::NULL)
    }

    /// Returns the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> NodeId {
        self.node(id).children.last().copied().unwrap_or(NodeId::NULL)
    }

    /// Returns the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> NodeId {
        self.node(id).next_sibling
    }

    /// Returns the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> NodeId {
        self.node(id).prev_sibling
    }

    /// Returns `true` if the node has at least one child.
    #[must_use]
    pub fn has_children(&self, id: NodeId) -> bool {
        !self.node(id).children.is_empty()
    }

    /// Returns an iterator over the children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            inner: self.node(id).children.iter(),
        }
    }

    /// Returns an iterator over a node and its ancestors (walking up to root).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: id.non_null(),
        }
    }

    /// Returns an iterator over all descendants of a node (depth-first,
    /// document order).
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = self.node(id).children.clone();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    // --- Search (direct children only) ---

    /// Returns the first direct child with the given tag.
    #[must_use]
    pub fn find_first_child_by_tag_name(&self, id: NodeId, tag: &str) -> NodeId {
        self.children(id)
            .find(|&child| self.tag(child) == tag)
            .unwrap_or(NodeId::NULL)
    }

    /// Returns all direct children with the given tag.
    #[must_use]
    pub fn find_children_by_tag_name(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.children(id)
            .filter(|&child| self.tag(child) == tag)
            .collect()
    }

    /// Returns the first direct child of the given type.
    #[must_use]
    pub fn find_first_child_by_type(&self, id: NodeId, node_type: NodeType) -> NodeId {
        self.children(id)
            .find(|&child| self.node_type(child) == node_type)
            .unwrap_or(NodeId::NULL)
    }

    /// Returns all direct children of the given type.
    #[must_use]
    pub fn find_children_by_type(&self, id: NodeId, node_type: NodeType) -> Vec<NodeId> {
        self.children(id)
            .filter(|&child| self.node_type(child) == node_type)
            .collect()
    }

    // --- Mutation ---

    /// Allocates a new, unattached node in the arena and returns its id.
    pub fn create_node(
        &mut self,
        node_type: NodeType,
        tag: impl Into<String>,
        content: impl Into<String>,
    ) -> NodeId {
        debug_assert!(node_type != NodeType::Null, "the Null node is unique");
        let index = self.nodes.len();
        self.nodes
            .push(NodeData::new(node_type, tag.into(), content.into()));
        NodeId::from_index(index)
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// Does nothing if either handle is `NULL`. `child` must not already
    /// have a parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.is_null() || child.is_null() {
            return;
        }
        debug_assert!(
            self.node(child).parent.is_null() && child != self.root,
            "child already has a parent"
        );

        let last = self.last_child(parent);
        if !last.is_null() {
            self.node_mut(last).next_sibling = child;
        }
        let child_data = self.node_mut(child);
        child_data.parent = parent;
        child_data.prev_sibling = last;
        child_data.next_sibling = NodeId::NULL;
        self.node_mut(parent).children.push(child);
    }

    /// Sets an attribute, replacing any previous value with the same name.
    pub fn set_attribute(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if id.is_null() {
            return;
        }
        self.node_mut(id).attributes.insert(name.into(), value.into());
    }

    /// Replaces the tag of a node.
    pub fn set_tag(&mut self, id: NodeId, tag: impl Into<String>) {
        if id.is_null() {
            return;
        }
        self.node_mut(id).tag = tag.into();
    }

    /// Replaces the content of a node.
    pub fn set_content(&mut self, id: NodeId, content: impl Into<String>) {
        if id.is_null() {
            return;
        }
        self.node_mut(id).content = content.into();
    }

    /// Returns the number of nodes in the arena, excluding the `Null` node.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'a> {
    inner: std::slice::Iter<'a, NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().copied()
    }
}

impl ExactSizeIterator for Children<'_> {}

/// Iterator over a node and its ancestors.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.parent(current).non_null();
        Some(current)
    }
}

/// Depth-first iterator over all descendants of a node.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.node(current).children.iter().rev().copied());
        Some(current)
    }
}
