//! Stable addressing of nodes within a forest.

use crate::node::{Document, Node};

/// One step down from a node to one of its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Sequence item at this index.
    Item(usize),
    /// Key node of the mapping entry at this index.
    Key(usize),
    /// Value node of the mapping entry at this index.
    Value(usize),
}

/// The address of one node in a forest: a document index plus the steps
/// from that document's root.
///
/// Paths stay valid as long as the forest's shape is unchanged. Replacing
/// a node's value through [`node_at_mut`] does not move any sibling, so
/// every path collected from one traversal can be dereferenced after any
/// number of such replacements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodePath {
    document: usize,
    steps: Vec<Step>,
}

impl NodePath {
    pub fn new(document: usize, steps: Vec<Step>) -> Self {
        Self { document, steps }
    }

    /// Index of the document this path points into.
    pub fn document(&self) -> usize {
        self.document
    }

    /// Steps from the document root to the addressed node.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl Node {
    /// The child selected by `step`, if the shapes agree.
    pub fn child(&self, step: Step) -> Option<&Node> {
        match (self, step) {
            (Node::Sequence(items), Step::Item(index)) => items.get(index),
            (Node::Mapping(entries), Step::Key(index)) => entries.get(index).map(|(key, _)| key),
            (Node::Mapping(entries), Step::Value(index)) => {
                entries.get(index).map(|(_, value)| value)
            }
            _ => None,
        }
    }

    /// Mutable variant of [`Node::child`].
    pub fn child_mut(&mut self, step: Step) -> Option<&mut Node> {
        match (self, step) {
            (Node::Sequence(items), Step::Item(index)) => items.get_mut(index),
            (Node::Mapping(entries), Step::Key(index)) => {
                entries.get_mut(index).map(|(key, _)| key)
            }
            (Node::Mapping(entries), Step::Value(index)) => {
                entries.get_mut(index).map(|(_, value)| value)
            }
            _ => None,
        }
    }
}

/// Resolve `path` against `forest`.
///
/// Returns `None` when the path points outside the forest or its steps no
/// longer match the tree's shape.
pub fn node_at<'a>(forest: &'a [Document], path: &NodePath) -> Option<&'a Node> {
    let mut node = forest.get(path.document())?.root();
    for step in path.steps() {
        node = node.child(*step)?;
    }
    Some(node)
}

/// Mutable variant of [`node_at`].
pub fn node_at_mut<'a>(forest: &'a mut [Document], path: &NodePath) -> Option<&'a mut Node> {
    let mut node = forest.get_mut(path.document())?.root_mut();
    for step in path.steps() {
        node = node.child_mut(*step)?;
    }
    Some(node)
}
