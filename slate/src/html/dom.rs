use std::fmt;

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, QualName, local_name, ns, parse_fragment as parse_html_fragment};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Name reported for text nodes, matching the `text` entry of the element table.
pub const TEXT_NODE_NAME: &str = "text";

/// A parsed content node: an element or a run of text.
///
/// Comments, doctypes and processing instructions are never exposed; they
/// carry no document content.
#[derive(Clone)]
pub struct Element {
    handle: Handle,
    // Dropping the last reference to the document node empties every
    // descendant, so each element keeps the whole tree alive.
    document: Handle,
}

impl Element {
    fn from_handle(handle: &Handle, document: &Handle) -> Option<Self> {
        match handle.data {
            NodeData::Element { .. } | NodeData::Text { .. } => Some(Element {
                handle: handle.clone(),
                document: document.clone(),
            }),
            _ => None,
        }
    }

    /// Local tag name, or `text` for text nodes.
    pub fn name(&self) -> &str {
        match &self.handle.data {
            NodeData::Element { name, .. } => &*name.local,
            _ => TEXT_NODE_NAME,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.handle.data, NodeData::Element { .. })
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        let NodeData::Element { attrs, .. } = &self.handle.data else {
            return None;
        };
        attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| attr.value.to_string())
    }

    /// Content children in document order.
    pub fn children(&self) -> Vec<Element> {
        self.handle
            .children
            .borrow()
            .iter()
            .filter_map(|child| Element::from_handle(child, &self.document))
            .collect()
    }

    /// All descendant text concatenated in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.handle, &mut out);
        out
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_element() {
            write!(f, "<{}>", self.name())
        } else {
            write!(f, "{:?}", self.text())
        }
    }
}

/// Parse a markup fragment and return its root elements.
///
/// The fragment is parsed as the content of a `<template>`, which accepts
/// table parts such as `<tr>` or `<td>` at the top level. Text and comments
/// sitting directly at the top level are dropped.
pub fn parse_fragment(html: &str) -> Vec<Element> {
    let context = QualName::new(None, ns!(html), local_name!("template"));
    let dom: RcDom =
        parse_html_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new(), false)
            .one(html);
    let document = dom.document.clone();

    let Some(root) = find_child_element(&document, "html") else {
        return Vec::new();
    };

    root.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .filter_map(|child| Element::from_handle(child, &document))
        .collect()
}

fn find_child_element(parent: &Handle, tag: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| match &child.data {
            NodeData::Element { name, .. } => &*name.local == tag,
            _ => false,
        })
        .cloned()
}

/// Walks with an explicit stack; inline wrappers can nest arbitrarily deep.
fn collect_text(handle: &Handle, out: &mut String) {
    let mut pending = vec![handle.clone()];
    while let Some(node) = pending.pop() {
        match &node.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } => {
                pending.extend(node.children.borrow().iter().rev().cloned());
            }
            _ => {}
        }
    }
}
