//! Core tree types: nodes, scalars, and documents.

/// One node in a parsed document tree.
///
/// Mapping entries preserve their document order, and keys are full nodes
/// rather than strings: formats like YAML allow structured keys, and a
/// scalar key is a legitimate place for a reference to appear.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Vec<(Node, Node)>),
}

/// A leaf value, tagged with the type the source format gave it.
///
/// Numbers keep their literal rendering so that round-tripping a document
/// does not reformat untouched values.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(String),
    String(String),
}

impl Node {
    /// Shorthand for a string scalar node.
    pub fn string(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::String(value.into()))
    }

    /// The string value of this node, if it is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }
}

/// A single parsed document.
///
/// Input streams may hold several documents; the engine works on a forest
/// (`&mut [Document]`) so that references shared across documents are still
/// deduplicated and rewritten together.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    root: Node,
}

impl Document {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }
}

impl From<Node> for Document {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}
