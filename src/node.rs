//! The values and nodes that make up a parsed tree.
use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};

/// A leaf value: element text, CDATA, a comment, or an attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Text kept as a string
    Text(String),

    /// The literals `true` / `false`, or a valueless attribute
    Bool(bool),

    /// A whole number
    Integer(i64),

    /// A number with a fraction or exponent
    Float(f64),
}
impl Scalar {
    /// Returns the string if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}
impl From<&str> for Scalar {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}
impl From<String> for Scalar {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

/// The value stored under a child key.
///
/// A key seen once holds a `Scalar` or a `Node`; seen again, it becomes a `List`
/// of every value that was added under it, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Text, CDATA, or a comment
    Scalar(Scalar),

    /// An element
    Node(Node),

    /// Same-named siblings
    List(Vec<Value>),
}
impl Value {
    /// Returns the scalar, if this is one.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Returns the node, if this is one.
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the siblings, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }
}
impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

/// The attributes of one tag, in the order they were written.
///
/// Keys already carry the configured attribute name prefix.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeMap {
    group: Option<String>,
    entries: IndexMap<String, Scalar>,
}
impl AttributeMap {
    pub(crate) fn new(group: Option<String>, entries: IndexMap<String, Scalar>) -> Self {
        Self { group, entries }
    }

    /// Get an attribute value by its (prefixed) key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries.get(key)
    }

    /// The key the attributes are grouped under, if grouping is configured.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Iterate over the attributes in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An element of the document tree, with a name, attributes, and children:
/// `<name attr="value">...</name>`
///
/// Dropping and comparing nodes walk the tree with an explicit stack, so any depth the
/// parser accepts is safe. `Clone`, `Debug` and [`Serialize`] recurse once per nesting
/// level and are bounded by the call stack of the calling thread.
#[derive(Debug, Clone)]
pub struct Node {
    tag_name: String,
    attributes: Option<AttributeMap>,
    children: Vec<(String, Value)>,
}
impl Node {
    pub(crate) fn new(
        tag_name: String,
        attributes: Option<AttributeMap>,
        children: Vec<(String, Value)>,
    ) -> Self {
        Self {
            tag_name,
            attributes,
            children,
        }
    }

    /// Get the name of the element.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Get the attributes of the element.
    ///
    /// `None` means no attribute survived extraction, which is distinct from an empty map.
    #[must_use]
    pub fn attributes(&self) -> Option<&AttributeMap> {
        self.attributes.as_ref()
    }

    /// Get an attribute value by its (prefixed) key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Scalar> {
        self.attributes.as_ref().and_then(|a| a.get(key))
    }

    /// Get the children of the element, in document order.
    #[must_use]
    pub fn children(&self) -> &[(String, Value)] {
        &self.children
    }

    /// Get a child by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.children.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl Node {
    /// Compare the header of two nodes, queueing their children for comparison.
    fn shallow_eq<'a>(
        &'a self,
        other: &'a Self,
        pending: &mut Vec<(&'a Value, &'a Value)>,
    ) -> bool {
        if self.tag_name != other.tag_name
            || self.attributes != other.attributes
            || self.children.len() != other.children.len()
        {
            return false;
        }

        let pairs = self.children.iter().zip(&other.children);
        for ((key, value), (other_key, other_value)) in pairs {
            if key != other_key {
                return false;
            }
            pending.push((value, other_value));
        }
        true
    }
}
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = Vec::new();
        if !self.shallow_eq(other, &mut pending) {
            return false;
        }

        while let Some((left, right)) = pending.pop() {
            let equal = match (left, right) {
                (Value::Scalar(left), Value::Scalar(right)) => left == right,
                (Value::Node(left), Value::Node(right)) => left.shallow_eq(right, &mut pending),
                (Value::List(left), Value::List(right)) if left.len() == right.len() => {
                    pending.extend(left.iter().zip(right));
                    true
                }
                _ => false,
            };
            if !equal {
                return false;
            }
        }
        true
    }
}
impl Drop for Node {
    fn drop(&mut self) {
        if self.children.iter().all(|(_, v)| matches!(v, Value::Scalar(_))) {
            return;
        }

        // Detach descendants so each node is dropped with no children left
        let mut pending: Vec<Value> = self.children.drain(..).map(|(_, v)| v).collect();
        while let Some(value) = pending.pop() {
            match value {
                Value::Node(mut node) => {
                    pending.extend(node.children.drain(..).map(|(_, v)| v));
                }
                Value::List(values) => pending.extend(values),
                Value::Scalar(_) => {}
            }
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let attribute_len = match &self.attributes {
            Some(attributes) if attributes.group.is_some() => 1,
            Some(attributes) => attributes.len(),
            None => 0,
        };

        let mut map = serializer.serialize_map(Some(attribute_len + self.children.len()))?;
        if let Some(attributes) = &self.attributes {
            match &attributes.group {
                Some(group) => map.serialize_entry(group, &attributes.entries)?,
                None => {
                    for (key, value) in &attributes.entries {
                        map.serialize_entry(key, value)?;
                    }
                }
            }
        }
        for (key, value) in &self.children {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        let mut entries = IndexMap::new();
        entries.insert("@_id".to_string(), Scalar::Integer(1));
        entries.insert("@_lang".to_string(), Scalar::from("en"));
        Node::new(
            "item".to_string(),
            Some(AttributeMap::new(None, entries)),
            vec![("#text".to_string(), Value::Scalar(Scalar::from("hello")))],
        )
    }

    #[test]
    fn test_lookups() {
        let node = sample();
        assert_eq!(node.tag_name(), "item");
        assert_eq!(node.attribute("@_id"), Some(&Scalar::Integer(1)));
        assert_eq!(node.attribute("@_missing"), None);
        assert_eq!(
            node.get("#text").and_then(Value::as_scalar),
            Some(&Scalar::from("hello"))
        );
    }

    #[test]
    fn test_attribute_order() {
        let node = sample();
        let keys: Vec<_> = node.attributes().unwrap().iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["@_id", "@_lang"]);
    }

    fn nested(depth: usize) -> Node {
        let mut node = Node::new("leaf".to_string(), None, Vec::new());
        for _ in 0..depth {
            node = Node::new(
                "n".to_string(),
                None,
                vec![("n".to_string(), Value::List(vec![Value::Node(node)]))],
            );
        }
        node
    }

    #[test]
    fn test_deep_tree_compare_and_drop() {
        let left = nested(200_000);
        let right = nested(200_000);
        assert!(left == right);
        assert!(left != nested(199_999));
        drop(left);
        drop(right);
    }

    #[test]
    fn test_equality() {
        assert_eq!(sample(), sample());

        let other = Node::new("item".to_string(), None, Vec::new());
        assert_ne!(sample(), other);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Bool(true).to_string(), "true");
        assert_eq!(Scalar::Integer(-3).to_string(), "-3");
        assert_eq!(Scalar::Float(1.5).to_string(), "1.5");
        assert_eq!(Scalar::from("x").to_string(), "x");
    }
}
