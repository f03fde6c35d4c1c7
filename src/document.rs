use crate::{Node, ParserOptions, Value, error::XmlResult, scanner::scan};
use serde::{Serialize, Serializer, ser::SerializeMap};

/// A parsed XML document: the ordered entries found at the top level.
///
/// Usually this is a single root element, but the parser is deliberately flexible:
/// - Several top-level elements are kept, in order (same-named ones become a list)
/// - Processing instructions and the DOCTYPE never appear in the tree
/// - Top-level comments appear only when a comment key is configured
/// - Text outside of any element is discarded
/// - Elements left open at the end of the input are kept as they are
///
/// Serializing a document (with `serde`) produces the usual JSON-like shape:
/// attributes first (prefixed or grouped), then children keyed by tag name or the
/// reserved text, CDATA and comment keys. Serialization recurses once per nesting
/// level, so very deep documents need a thread with a large enough stack.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    children: Vec<(String, Value)>,
}
impl Document {
    /// Parse a document with the default options.
    ///
    /// # Errors
    /// Returns an error if a construct is never terminated.
    ///
    /// # Example
    /// ```rust
    /// use tagtree::{Document, Scalar};
    ///
    /// let doc = Document::parse("<test><test2>test</test2><n>12</n></test>").unwrap();
    /// let test = doc.root().unwrap();
    /// assert_eq!(test.tag_name(), "test");
    ///
    /// let n = test.get("n").and_then(|v| v.as_node()).unwrap();
    /// assert_eq!(n.get("#text").and_then(|v| v.as_scalar()), Some(&Scalar::Integer(12)));
    /// ```
    pub fn parse(src: &str) -> XmlResult<Self> {
        Self::parse_with(src, &ParserOptions::default())
    }

    /// Parse a document with the given options.
    ///
    /// # Errors
    /// Returns an error if a construct is never terminated.
    pub fn parse_with(src: &str, options: &ParserOptions) -> XmlResult<Self> {
        let children = scan(src, options)?;
        Ok(Self { children })
    }

    /// The top-level entries, in document order.
    #[must_use]
    pub fn children(&self) -> &[(String, Value)] {
        &self.children
    }

    /// Get a top-level entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.children.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The first top-level element, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.children.iter().find_map(|(_, value)| match value {
            Value::Node(node) => Some(node),
            Value::List(values) => values.first().and_then(Value::as_node),
            Value::Scalar(_) => None,
        })
    }

    /// Return true if nothing was found at the top level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Take ownership of the top-level entries.
    #[must_use]
    pub fn into_children(self) -> Vec<(String, Value)> {
        self.children
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len()))?;
        for (key, value) in &self.children {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
