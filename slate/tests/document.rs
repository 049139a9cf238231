use serde_json::json;

use slate::document::{IMAGE, PARAGRAPH};
use slate::{DocNode, Document, Leaf, Node};

#[test]
fn leaf_and_node_are_told_apart_by_text() {
    let document: Document = serde_json::from_value(json!([
        {"type": "paragraph", "children": [{"text": "a", "italic": true}]}
    ]))
    .unwrap();

    let node = document.nodes[0].as_node().expect("node");
    assert_eq!(node.kind, PARAGRAPH);
    let leaf = node.children[0].as_leaf().expect("leaf");
    assert_eq!(leaf.text, "a");
    assert!(leaf.has_mark("italic"));
    assert!(!leaf.has_mark("strong"));
}

#[test]
fn node_data_survives_json() {
    let value = json!([{
        "type": "link",
        "url": "https://example.com",
        "children": [{"text": "site"}]
    }]);
    let document: Document = serde_json::from_value(value.clone()).unwrap();
    let node = document.nodes[0].as_node().unwrap();
    assert_eq!(node.data["url"], json!("https://example.com"));
    assert_eq!(serde_json::to_value(&document).unwrap(), value);
}

#[test]
fn image_without_children_key() {
    let document: Document =
        serde_json::from_value(json!([{"type": "image", "src": "a.png"}])).unwrap();
    let node = document.nodes[0].as_node().unwrap();
    assert_eq!(node.kind, IMAGE);
    assert!(node.is_image());
    assert!(node.children.is_empty());
}

#[test]
fn false_marks_are_not_set() {
    let leaf: Leaf = serde_json::from_value(json!({"text": "x", "strong": false})).unwrap();
    assert!(!leaf.has_mark("strong"));
}

#[test]
fn leaf_with_non_boolean_key_is_rejected() {
    assert!(serde_json::from_value::<DocNode>(json!({"text": "x", "strong": "yes"})).is_err());
}

#[test]
fn empty_state_shape() {
    assert_eq!(
        serde_json::to_value(Document::empty_state()).unwrap(),
        json!([{"type": "paragraph", "children": [{"text": ""}]}])
    );
}

#[test]
fn builders() {
    let node = Node::new("listItem", vec![Leaf::new("x").with_mark("underline").into()])
        .with_data("checked", true);
    assert_eq!(
        serde_json::to_value(DocNode::from(node)).unwrap(),
        json!({
            "type": "listItem",
            "children": [{"text": "x", "underline": true}],
            "checked": true
        })
    );
}
