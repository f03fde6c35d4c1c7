//! Build-time storage for the tree.
//!
//! Elements live in a flat vector while the document is scanned, and refer to
//! their children by index. Once scanning is done the arena is turned into an
//! owned [`Node`] tree bottom-up, so neither building nor materializing recurses.
use crate::{AttributeMap, Node, Scalar, Value};

/// Index of an element in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A child value while the tree is under construction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Scalar(Scalar),
    Node(NodeId),
    List(Vec<Slot>),
}

/// An element while the tree is under construction.
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub tag_name: String,
    pub attributes: Option<AttributeMap>,
    pub children: Vec<(String, Slot)>,

    /// Offset of the `>` ending the opening tag
    pub start_index: usize,
}
impl NodeData {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: None,
            children: Vec::new(),
            start_index: 0,
        }
    }

    /// Add a child under `key`, turning a repeated key into a list.
    pub fn push(&mut self, key: &str, slot: Slot) {
        let Some((_, existing)) = self.children.iter_mut().find(|(k, _)| k == key) else {
            self.children.push((key.to_string(), slot));
            return;
        };

        match existing {
            Slot::List(items) => items.push(slot),
            _ => {
                let first = std::mem::replace(existing, Slot::List(Vec::with_capacity(2)));
                if let Slot::List(items) = existing {
                    items.push(first);
                    items.push(slot);
                }
            }
        }
    }
}

/// An add-only arena of elements.
///
/// Children are always allocated after their parent, so every child id is
/// greater than its parent's id.
#[derive(Debug, Default)]
pub(crate) struct NodeArena(Vec<NodeData>);
impl NodeArena {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn alloc(&mut self, node: NodeData) -> NodeId {
        self.0.push(node);
        NodeId(self.0.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.0[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.0[id.0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Converts the arena into owned nodes and returns the children of `root`.
    ///
    /// Nodes are built from the highest id down, so each child is complete before its
    /// parent needs it.
    /// Nodes not reachable from `root` are dropped.
    pub fn into_children(self, root: NodeId) -> Vec<(String, Value)> {
        let mut built: Vec<Option<Node>> = Vec::with_capacity(self.0.len());
        built.resize_with(self.0.len(), || None);

        let mut root_children = Vec::new();
        for (index, data) in self.0.into_iter().enumerate().rev() {
            let children: Vec<(String, Value)> = data
                .children
                .into_iter()
                .map(|(key, slot)| (key, materialize(slot, &mut built)))
                .collect();

            if index == root.0 {
                root_children = children;
            } else {
                built[index] = Some(Node::new(data.tag_name, data.attributes, children));
            }
        }

        root_children
    }
}

fn materialize(slot: Slot, built: &mut [Option<Node>]) -> Value {
    match slot {
        Slot::Scalar(scalar) => Value::Scalar(scalar),
        // Each node is referenced by exactly one slot
        Slot::Node(id) => built[id.0]
            .take()
            .map_or_else(|| Value::List(Vec::new()), Value::Node),
        // Lists are never nested, so this recurses at most once
        Slot::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| materialize(item, built))
                .collect(),
        ),
    }
}
