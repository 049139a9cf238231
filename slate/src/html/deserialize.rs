use log::{debug, trace, warn};

use crate::document::{DocNode, Document, IMAGE, Leaf, Node};
use crate::html::MAX_DEPTH;
use crate::html::dom::{self, Element};
use crate::html::tables::ClassificationTables;
use crate::text;

/// Convert an HTML fragment into a document using the default tables.
pub fn deserialize<'a>(html: impl Into<Option<&'a str>>) -> Document {
    deserialize_with(html, &ClassificationTables::default())
}

/// Convert an HTML fragment into a document.
///
/// Empty input, or input without any root element, yields
/// [`Document::empty_state`].
pub fn deserialize_with<'a>(
    html: impl Into<Option<&'a str>>,
    tables: &ClassificationTables,
) -> Document {
    let html = html.into().unwrap_or_default();
    if html.is_empty() {
        return Document::empty_state();
    }

    // Line breaks become plain newlines instead of child elements.
    let html = html.replace("<br>", "\n");
    let roots = dom::parse_fragment(&html);
    debug!("deserializing html fragment with {} root element(s)", roots.len());

    if roots.is_empty() {
        return Document::empty_state();
    }

    let context = Context { tables };
    roots
        .iter()
        .map(|root| DocNode::Node(context.element_to_node(root, 1)))
        .collect()
}

/// How a child element contributes to its parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildKind {
    Block,
    Inline,
    TextRun,
    Skip,
}

/// Tables for the duration of one call.
struct Context<'t> {
    tables: &'t ClassificationTables,
}

impl Context<'_> {
    fn classify_child(&self, child: &Element, depth: usize) -> ChildKind {
        let name = child.name();
        let kind = if self.tables.is_block(name) {
            ChildKind::Block
        } else if self.tables.is_inline(name) {
            ChildKind::Inline
        } else if text::is_blank(&child.text()) {
            ChildKind::Skip
        } else {
            ChildKind::TextRun
        };

        if kind == ChildKind::Block && depth >= MAX_DEPTH {
            warn!("block nesting deeper than {MAX_DEPTH} levels, flattening <{name}> to text");
            return if text::is_blank(&child.text()) {
                ChildKind::Skip
            } else {
                ChildKind::TextRun
            };
        }

        trace!("{child:?} classified as {kind:?}");
        kind
    }

    fn element_to_node(&self, element: &Element, depth: usize) -> Node {
        let element_type = self.tables.element_type(&lookup_key(element));

        let mut children = Vec::new();
        for child in element.children() {
            match self.classify_child(&child, depth) {
                ChildKind::Block => {
                    children.push(DocNode::Node(self.element_to_node(&child, depth + 1)));
                }
                ChildKind::Inline => children.push(DocNode::Node(self.element_to_inline(&child))),
                ChildKind::TextRun => {
                    children.extend(self.element_to_texts(&child).into_iter().map(DocNode::Leaf));
                }
                ChildKind::Skip => {}
            }
        }

        if children.is_empty() && element_type.label() != IMAGE {
            children.push(DocNode::Leaf(Leaf::empty()));
        }

        let node = Node::new(element_type.label(), children);
        element_type.apply(node, element)
    }

    /// Inline nodes hold text runs only; nested structure is flattened.
    fn element_to_inline(&self, element: &Element) -> Node {
        let element_type = self.tables.element_type(&lookup_key(element));

        let mut children: Vec<DocNode> = element
            .children()
            .iter()
            .flat_map(|child| self.element_to_texts(child))
            .map(DocNode::Leaf)
            .collect();

        if children.is_empty() {
            children.push(DocNode::Leaf(Leaf::empty()));
        }

        Node::new(element_type.label(), children)
    }

    fn element_to_texts(&self, element: &Element) -> Vec<Leaf> {
        if !element.is_element() {
            return vec![self.element_to_text(element, None)];
        }

        let mark = self.tables.mark(element.name());
        element
            .children()
            .iter()
            .map(|child| self.element_to_text(child, mark))
            .collect()
    }

    /// Marks accumulate: the enclosing element's mark and the child's own.
    fn element_to_text(&self, element: &Element, outer_mark: Option<&str>) -> Leaf {
        let own_mark = self.tables.mark(element.name());
        [outer_mark, own_mark]
            .into_iter()
            .flatten()
            .fold(Leaf::new(element.text()), |leaf, mark| leaf.with_mark(mark))
    }
}

/// Tag name, suffixed with the `type` attribute when present (`ol` + `a`).
fn lookup_key(element: &Element) -> String {
    match element.attribute("type") {
        Some(variant) => format!("{}{}", element.name(), variant),
        None => element.name().to_string(),
    }
}
