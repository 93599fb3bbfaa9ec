//! # craftxml
//!
//! A small, embeddable XML parser. It turns a text buffer into a typed,
//! navigable document tree and reports the first malformed construct as a
//! status code with a byte offset.
//!
//! ## Quick Start
//!
//! ```
//! use craftxml::{Document, NodeType, ParseFlags, ParseStatus};
//!
//! let outcome = Document::load_str("<root><child>Hello</child></root>", ParseFlags::FULL);
//! assert_eq!(outcome.status, ParseStatus::NoError);
//!
//! let doc = outcome.document;
//! let root = doc.root_element();
//! assert_eq!(doc.tag(root), "root");
//!
//! let child = doc.find_first_child_by_tag_name(root, "child");
//! assert_eq!(doc.node_type(child), NodeType::Element);
//! assert_eq!(doc.content(child), "Hello");
//! ```
//!
//! Malformed input is reported, not panicked on:
//!
//! ```
//! use craftxml::{Document, ParseFlags, ParseStatus};
//!
//! let outcome = Document::load_str("<a></b>", ParseFlags::FULL);
//! assert_eq!(outcome.status, ParseStatus::TagNotMatchedError);
//! assert_eq!(outcome.offset, 5);
//! ```

pub mod encoding;
pub mod error;
pub mod parser;
pub mod tree;

// Re-export primary types at the crate root for convenience.
pub use error::{ParseError, ParseStatus, SourceLocation};
pub use parser::{LoadOutcome, ParseFlags};
pub use tree::{Document, NodeData, NodeId, NodeType};
