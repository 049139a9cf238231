use serde_json::{Value, json};

use slate::plain::{self, SerializeOptions};
use slate::{DocNode, Document, Leaf, Node};

fn to_json(text: &str) -> Value {
    serde_json::to_value(plain::deserialize(text)).unwrap()
}

fn paragraphs(blocks: &[&str]) -> Value {
    Value::Array(
        blocks
            .iter()
            .map(|block| json!({"type": "paragraph", "children": [{"text": block}]}))
            .collect(),
    )
}

#[test]
fn empty_input_is_single_empty_paragraph() {
    assert_eq!(to_json(""), paragraphs(&[""]));
    assert_eq!(
        serde_json::to_value(plain::deserialize(None::<&str>)).unwrap(),
        paragraphs(&[""])
    );
    assert_eq!(plain::deserialize(""), Document::empty_state());
}

#[test]
fn blank_input_is_single_empty_paragraph() {
    assert_eq!(to_json("   \n\n  \t\n"), paragraphs(&[""]));
}

#[test]
fn blank_line_splits_paragraphs() {
    assert_eq!(to_json("line1\n\nline2"), paragraphs(&["line1", "line2"]));
}

#[test]
fn single_newline_stays_in_paragraph() {
    assert_eq!(to_json("line1\nline2"), paragraphs(&["line1\nline2"]));
}

#[test]
fn blank_runs_collapse() {
    assert_eq!(to_json("a\n\n\n\nb"), paragraphs(&["a", "b"]));
    assert_eq!(to_json("a\n   \n\t\nb"), paragraphs(&["a", "b"]));
}

#[test]
fn lines_and_text_are_trimmed() {
    assert_eq!(
        to_json("\n\n  first  \n  second\n\n third \n\n"),
        paragraphs(&["first\nsecond", "third"])
    );
}

#[test]
fn carriage_returns_are_trimmed() {
    assert_eq!(to_json("a\r\n\r\nb\r\n"), paragraphs(&["a", "b"]));
}

#[test]
fn serialize_joins_with_newline_by_default() {
    let document = plain::deserialize("a\n\nb");
    assert_eq!(plain::serialize(&document, &SerializeOptions::default()), "a\nb");
}

#[test]
fn round_trip_with_blank_line_delimiter() {
    let options = SerializeOptions::with_delimiter("\n\n");
    let text = "first line\nsecond line\n\nnext paragraph";
    assert_eq!(plain::serialize(&plain::deserialize(text), &options), text);
}

#[test]
fn round_trip_single_block() {
    let text = "one\ntwo\nthree";
    assert_eq!(
        plain::serialize(&plain::deserialize(text), &SerializeOptions::default()),
        text
    );
}

#[test]
fn delimiter_applies_at_every_level() {
    let document = Document::new(vec![
        DocNode::Node(Node::new(
            "paragraph",
            vec![
                DocNode::Leaf(Leaf::new("a")),
                DocNode::Node(Node::new("link", vec![DocNode::Leaf(Leaf::new("b"))])),
                DocNode::Leaf(Leaf::new("c").with_mark("strong")),
            ],
        )),
        DocNode::Node(Node::new("paragraph", vec![DocNode::Leaf(Leaf::new("d"))])),
    ]);
    assert_eq!(
        plain::serialize(&document, &SerializeOptions::with_delimiter(" | ")),
        "a | b | c | d"
    );
}

#[test]
fn serialize_empty_document() {
    assert_eq!(
        plain::serialize(&Document::default(), &SerializeOptions::default()),
        ""
    );
}

#[test]
fn serialize_value_requires_array() {
    let options = SerializeOptions::default();
    assert_eq!(plain::serialize_value(&json!(null), &options).unwrap(), "");
    assert_eq!(plain::serialize_value(&json!({"text": "a"}), &options).unwrap(), "");
    assert_eq!(
        plain::serialize_value(
            &json!([
                {"type": "paragraph", "children": [{"text": "a"}]},
                {"type": "paragraph", "children": [{"text": "b", "italic": true}]}
            ]),
            &options
        )
        .unwrap(),
        "a\nb"
    );
    assert!(plain::serialize_value(&json!([42]), &options).is_err());
}
