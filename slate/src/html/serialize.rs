use serde_json::Value;

use crate::document::{DocNode, Document};
use crate::error::{Error, Result};
use crate::html::MAX_DEPTH;
use crate::html::tables::tag_for_type;

/// Render a document as HTML using the default element table.
///
/// Leaves are written as raw text without their marks, and every node type
/// must have an entry in the default table.
pub fn serialize(document: &Document) -> Result<String> {
    let mut out = String::new();
    for node in document {
        write_node(node, &mut out, 1)?;
    }
    Ok(out)
}

/// Render a JSON document. Anything other than an array renders as `""`.
pub fn serialize_value(value: &Value) -> Result<String> {
    if !value.is_array() {
        return Ok(String::new());
    }
    let document: Document = serde_json::from_value(value.clone())?;
    serialize(&document)
}

fn write_node(node: &DocNode, out: &mut String, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::TooDeep(MAX_DEPTH));
    }

    match node {
        DocNode::Leaf(leaf) => out.push_str(&leaf.text),
        DocNode::Node(node) => {
            let tag = tag_for_type(&node.kind)
                .ok_or_else(|| Error::UnmappedType(node.kind.clone()))?;

            out.push('<');
            out.push_str(tag);
            out.push('>');
            for child in &node.children {
                write_node(child, out, depth + 1)?;
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
    Ok(())
}
