//! Plain text to document tree conversion and back.
//!
//! Blank lines separate paragraphs; every paragraph holds a single leaf.

use serde_json::Value;

use crate::document::{DocNode, Document, Leaf, Node, PARAGRAPH};
use crate::error::Result;
use crate::text;

/// Options for [`serialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Joins sibling nodes at every level, including the top level.
    pub delimiter: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions {
            delimiter: "\n".to_string(),
        }
    }
}

impl SerializeOptions {
    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        SerializeOptions {
            delimiter: delimiter.into(),
        }
    }
}

/// Split text into one paragraph per blank-line separated block.
pub fn deserialize<'a>(text: impl Into<Option<&'a str>>) -> Document {
    let text = text.into().unwrap_or_default();

    split_into_blocks(text)
        .into_iter()
        .map(|block| DocNode::Node(Node::new(PARAGRAPH, vec![DocNode::Leaf(Leaf::new(block))])))
        .collect()
}

pub fn serialize(document: &Document, options: &SerializeOptions) -> String {
    join_nodes(&document.nodes, &options.delimiter)
}

/// Render a JSON document. Anything other than an array renders as `""`.
pub fn serialize_value(value: &Value, options: &SerializeOptions) -> Result<String> {
    if !value.is_array() {
        return Ok(String::new());
    }
    let document: Document = serde_json::from_value(value.clone())?;
    Ok(serialize(&document, options))
}

fn join_nodes(nodes: &[DocNode], delimiter: &str) -> String {
    nodes
        .iter()
        .map(|node| serialize_node(node, delimiter))
        .collect::<Vec<_>>()
        .join(delimiter)
}

fn serialize_node(node: &DocNode, delimiter: &str) -> String {
    match node {
        DocNode::Leaf(leaf) => leaf.text.clone(),
        DocNode::Node(node) => join_nodes(&node.children, delimiter),
    }
}

/// A lone block is kept even when empty; with several, empty ones are dropped.
fn split_into_blocks(input: &str) -> Vec<String> {
    let trimmed = text::trim(input);
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    if !trimmed.is_empty() {
        for line in trimmed.split('\n').map(text::trim) {
            if line.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            } else {
                current.push(line);
            }
        }
    }
    blocks.push(current.join("\n"));

    if blocks.len() > 1 {
        blocks.retain(|block| !block.is_empty());
    }
    blocks
}
