//! Tree construction
//!
//! The builder owns the element stack, the current element, and the jPath of the
//! current position. The scanner drives it; nothing here looks at source text.
use crate::{
    AttributeMap, Scalar, Value,
    arena::{NodeArena, NodeData, NodeId, Slot},
};

/// Name of the synthetic element holding the document's top-level entries.
const ROOT_TAG: &str = "!xml";

/// Dot-joined names of the open elements, excluding the synthetic root: `a.b.c`
#[derive(Debug, Default, Clone)]
pub struct JPath {
    path: String,
    marks: Vec<usize>,
}
impl JPath {
    /// Append a segment.
    pub fn push(&mut self, name: &str) {
        self.marks.push(self.path.len());
        if !self.path.is_empty() {
            self.path.push('.');
        }
        self.path.push_str(name);
    }

    /// Remove the last segment.
    pub fn pop(&mut self) {
        if let Some(mark) = self.marks.pop() {
            self.path.truncate(mark);
        }
    }

    /// The path as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.path
    }
}

/// Incrementally builds the tree for one document.
#[derive(Debug)]
pub struct TreeBuilder {
    arena: NodeArena,
    root: NodeId,
    current: NodeId,
    stack: Vec<NodeId>,
    path: JPath,
}
impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl TreeBuilder {
    /// Create a builder positioned at the synthetic root.
    #[must_use]
    pub fn new() -> Self {
        let mut arena = NodeArena::new();
        let root = arena.alloc(NodeData::new(ROOT_TAG));
        Self {
            arena,
            root,
            current: root,
            stack: Vec::new(),
            path: JPath::default(),
        }
    }

    /// The element currently receiving children.
    #[must_use]
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Return true if the current element is the synthetic root.
    #[must_use]
    pub fn at_root(&self) -> bool {
        self.current == self.root
    }

    /// The jPath of the current position.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Number of open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Tag name of an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> &str {
        &self.arena.get(id).tag_name
    }

    /// Return true if the element has attributes.
    #[must_use]
    pub fn has_attributes(&self, id: NodeId) -> bool {
        self.arena.get(id).attributes.is_some()
    }

    /// Return true if the element has no children yet.
    #[must_use]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.arena.get(id).children.is_empty()
    }

    /// Offset of the `>` that ended the element's opening tag.
    #[must_use]
    pub fn start_index(&self, id: NodeId) -> usize {
        self.arena.get(id).start_index
    }

    /// Create a detached element and extend the jPath with its name.
    ///
    /// The element must then be attached with [`TreeBuilder::add_child`], and either
    /// entered with [`TreeBuilder::descend`] or finished with [`TreeBuilder::leave_path`].
    pub fn start_element(&mut self, name: &str) -> NodeId {
        self.path.push(name);
        self.arena.alloc(NodeData::new(name))
    }

    /// Set the attributes and source offset of a new element.
    pub fn set_details(
        &mut self,
        id: NodeId,
        attributes: Option<AttributeMap>,
        start_index: usize,
    ) {
        let node = self.arena.get_mut(id);
        node.attributes = attributes;
        node.start_index = start_index;
    }

    /// Attach `child` under `parent`, keyed by its tag name.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let key = self.arena.get(child).tag_name.clone();
        self.arena.get_mut(parent).push(&key, Slot::Node(child));
    }

    /// Make `id` the current element, keeping the previous one on the stack.
    pub fn descend(&mut self, id: NodeId) {
        self.stack.push(self.current);
        self.current = id;
    }

    /// Drop the last jPath segment of an element that was never descended into.
    pub fn leave_path(&mut self) {
        self.path.pop();
    }

    /// Add a scalar child under `key`.
    pub fn add_text(&mut self, id: NodeId, key: &str, value: Scalar) {
        self.arena.get_mut(id).push(key, Slot::Scalar(value));
    }

    /// Replace all children of an element with a single scalar under `key`.
    pub fn replace_children(&mut self, id: NodeId, key: &str, value: Scalar) {
        let node = self.arena.get_mut(id);
        node.children.clear();
        node.push(key, Slot::Scalar(value));
    }

    /// Close the current element and return it; its parent becomes current.
    ///
    /// Returns `None` at the root, where there is nothing to close.
    pub fn close_element(&mut self) -> Option<NodeId> {
        let parent = self.stack.pop()?;
        let closed = self.current;
        self.current = parent;
        self.path.pop();
        Some(closed)
    }

    /// Finish building and return the top-level entries.
    #[must_use]
    pub fn finish(self) -> Vec<(String, Value)> {
        tracing::trace!(elements = self.arena.len() - 1, "materializing tree");
        self.arena.into_children(self.root)
    }
}
