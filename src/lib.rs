//! # tagtree
//!
//! A single-pass XML parser that turns a document into an ordered tree of tagged nodes.
//!
//! It is deliberately forgiving: anything that is not a recognized construct is text,
//! and only unterminated constructs are errors. On top of the tree it handles:
//! - Built-in and DTD-declared entities, and optionally the HTML entity set
//! - Attributes, with configurable prefixes, grouping, and boolean attributes
//! - Coercion of text and attribute values into booleans and numbers
//! - Namespace prefix removal
//! - "Stop nodes", whose content is kept as raw text
//! - Unpaired tags like `<br>`
//!
//! ```rust
//! use tagtree::{Document, ParserOptions, Scalar, Value};
//!
//! let src = r#"<catalog><book id="1"><price>9.5</price></book><book id="2"/></catalog>"#;
//! let options = ParserOptions::new().ignore_attributes(false);
//! let doc = Document::parse_with(src, &options).unwrap();
//!
//! let catalog = doc.root().unwrap();
//! let books = catalog.get("book").and_then(Value::as_list).unwrap();
//! assert_eq!(books.len(), 2);
//!
//! let first = books[0].as_node().unwrap();
//! assert_eq!(first.attribute("@_id"), Some(&Scalar::from("1")));
//! ```
//!
//! Documents serialize with `serde` into the usual JSON-like shape:
//! attributes first, then children keyed by tag name, with `#text` for text.
#![warn(missing_docs)]

mod error;
pub use error::{ErrorContext, XmlError, XmlErrorKind, XmlResult};

mod strspan;
pub use strspan::*;

mod options;
pub use options::*;

mod number;
pub use number::*;

mod coerce;
pub use coerce::*;

mod node;
pub use node::*;

mod entities;
pub use entities::*;

mod attributes;
pub use attributes::*;

mod dtd;
pub use dtd::*;

mod arena;
mod builder;

mod scanner;
pub use scanner::XmlParser;

mod document;
pub use document::*;
