use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type tag of the canonical block node.
pub const PARAGRAPH: &str = "paragraph";
/// Type tag of image nodes, the only nodes allowed to have no children.
pub const IMAGE: &str = "image";
/// Type tag of ordered lists.
pub const ORDERED_LIST: &str = "orderedList";

/// A Document is the ordered sequence of top-level nodes an editor holds.
///
/// Encodes to JSON as a bare array, e.g.
/// `[{"type": "paragraph", "children": [{"text": ""}]}]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub nodes: Vec<DocNode>,
}

impl Document {
    pub fn new(nodes: Vec<DocNode>) -> Self {
        Document { nodes }
    }

    /// The document an editor starts from: one paragraph holding one empty leaf.
    pub fn empty_state() -> Self {
        Document {
            nodes: vec![DocNode::Node(Node::new(PARAGRAPH, vec![Leaf::empty().into()]))],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocNode> {
        self.nodes.iter()
    }
}

impl FromIterator<DocNode> for Document {
    fn from_iter<I: IntoIterator<Item = DocNode>>(iter: I) -> Self {
        Document {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a DocNode;
    type IntoIter = std::slice::Iter<'a, DocNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// A single entry of the document tree.
///
/// Leaves carry `text`, containers carry `type` and `children`. The JSON
/// form has no explicit tag: an object with a `text` key is a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocNode {
    Leaf(Leaf),
    Node(Node),
}

impl DocNode {
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            DocNode::Leaf(leaf) => Some(leaf),
            DocNode::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            DocNode::Node(node) => Some(node),
            DocNode::Leaf(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, DocNode::Leaf(_))
    }
}

impl From<Leaf> for DocNode {
    fn from(leaf: Leaf) -> Self {
        DocNode::Leaf(leaf)
    }
}

impl From<Node> for DocNode {
    fn from(node: Node) -> Self {
        DocNode::Node(node)
    }
}

/// A container node: a type tag plus its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub children: Vec<DocNode>,
    /// Extra attributes attached by node hooks (a link's `url`, an image's `src`).
    #[serde(flatten)]
    pub data: BTreeMap<String, Value>,
}

impl Node {
    pub fn new(kind: impl Into<String>, children: Vec<DocNode>) -> Self {
        Node {
            kind: kind.into(),
            children,
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn is_image(&self) -> bool {
        self.kind == IMAGE
    }
}

/// A run of text with its formatting marks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Leaf {
    pub text: String,
    #[serde(flatten)]
    pub marks: BTreeMap<String, bool>,
}

impl Leaf {
    pub fn new(text: impl Into<String>) -> Self {
        Leaf {
            text: text.into(),
            marks: BTreeMap::new(),
        }
    }

    pub fn empty() -> Self {
        Leaf::default()
    }

    pub fn with_mark(mut self, mark: impl Into<String>) -> Self {
        self.marks.insert(mark.into(), true);
        self
    }

    pub fn has_mark(&self, mark: &str) -> bool {
        self.marks.get(mark).copied().unwrap_or(false)
    }
}
