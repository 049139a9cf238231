use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::document::{Node, ORDERED_LIST, PARAGRAPH};
use crate::html::dom::Element;

/// Default tag to node type table, in lookup priority order.
///
/// Serialization walks this list front to back, so `paragraph` maps back to
/// `p` and never to `div`.
pub const DEFAULT_ELEMENTS: &[(&str, &str)] = &[
    ("a", "link"),
    ("img", "image"),
    ("li", "listItem"),
    ("p", "paragraph"),
    ("div", "paragraph"),
    ("ol", "orderedList"),
    ("ul", "unorderedList"),
    ("table", "table"),
    ("tbody", "tbody"),
    ("tr", "tr"),
    ("td", "td"),
    ("text", "text"),
    ("hr", "hr"),
    ("figure", "figure"),
    ("figcaption", "figcaption"),
];

pub const DEFAULT_BLOCK_ELEMENTS: &[&str] = &[
    "figure",
    "figcaption",
    "hr",
    "img",
    "li",
    "p",
    "ol",
    "ul",
    "table",
    "tbody",
    "tr",
    "td",
];

pub const DEFAULT_INLINE_ELEMENTS: &[&str] = &["a"];

pub const DEFAULT_MARK_ELEMENTS: &[(&str, &str)] =
    &[("em", "italic"), ("strong", "strong"), ("u", "underline")];

/// Tag used for the lookup fallback when a key is missing.
const FALLBACK_KEY: &str = "p";
const ORDERED_LIST_TAG: &str = "ol";
/// Leaves keep their content under `text`, so no mark may use that name.
pub const RESERVED_MARK: &str = "text";

/// Post-processing applied to a freshly built block node.
pub type NodeHook = Arc<dyn Fn(Node, &Element) -> Node + Send + Sync>;

/// What an entry of the element table resolves to.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub enum ElementType {
    Label(String),
    /// A node type whose built node is passed through `hook` before use.
    Hook { label: String, hook: NodeHook },
}

impl ElementType {
    pub fn hook<F>(label: impl Into<String>, hook: F) -> Self
    where
        F: Fn(Node, &Element) -> Node + Send + Sync + 'static,
    {
        ElementType::Hook {
            label: label.into(),
            hook: Arc::new(hook),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ElementType::Label(label) | ElementType::Hook { label, .. } => label.as_str(),
        }
    }

    pub(crate) fn apply(&self, node: Node, element: &Element) -> Node {
        match self {
            ElementType::Label(_) => node,
            ElementType::Hook { hook, .. } => hook(node, element),
        }
    }
}

impl From<String> for ElementType {
    fn from(label: String) -> Self {
        ElementType::Label(label)
    }
}

impl From<&str> for ElementType {
    fn from(label: &str) -> Self {
        ElementType::Label(label.to_string())
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Label(label) => f.debug_tuple("Label").field(label).finish(),
            ElementType::Hook { label, .. } => {
                f.debug_struct("Hook").field("label", label).finish_non_exhaustive()
            }
        }
    }
}

/// Per-call replacements for the default tables. Each one is independent: a
/// missing table keeps its default.
///
/// Deserializable from TOML:
///
/// ```toml
/// block_elements = ["p", "blockquote"]
///
/// [elements]
/// blockquote = "quote"
///
/// [mark_elements]
/// b = "strong"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassificationOverrides {
    pub elements: Option<HashMap<String, ElementType>>,
    pub block_elements: Option<HashSet<String>>,
    pub inline_elements: Option<HashSet<String>>,
    #[serde(deserialize_with = "deserialize_marks")]
    pub mark_elements: Option<HashMap<String, String>>,
}

fn deserialize_marks<'de, D>(deserializer: D) -> Result<Option<HashMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let marks = HashMap::<String, String>::deserialize(deserializer)?;
    if let Some(tag) = marks
        .iter()
        .find_map(|(tag, mark)| (mark.as_str() == RESERVED_MARK).then_some(tag))
    {
        return Err(serde::de::Error::custom(format!(
            "mark for `{tag}` cannot be named `{RESERVED_MARK}`"
        )));
    }
    Ok(Some(marks))
}

/// The four lookup structures that decide how each element is converted.
#[derive(Debug, Clone)]
pub struct ClassificationTables {
    pub elements: HashMap<String, ElementType>,
    pub block_elements: HashSet<String>,
    pub inline_elements: HashSet<String>,
    pub mark_elements: HashMap<String, String>,
}

impl Default for ClassificationTables {
    fn default() -> Self {
        ClassificationTables {
            elements: default_elements(),
            block_elements: to_set(DEFAULT_BLOCK_ELEMENTS),
            inline_elements: to_set(DEFAULT_INLINE_ELEMENTS),
            mark_elements: DEFAULT_MARK_ELEMENTS
                .iter()
                .map(|(tag, mark)| (tag.to_string(), mark.to_string()))
                .collect(),
        }
    }
}

impl From<ClassificationOverrides> for ClassificationTables {
    fn from(overrides: ClassificationOverrides) -> Self {
        let defaults = ClassificationTables::default();
        ClassificationTables {
            elements: overrides.elements.unwrap_or(defaults.elements),
            block_elements: overrides.block_elements.unwrap_or(defaults.block_elements),
            inline_elements: overrides.inline_elements.unwrap_or(defaults.inline_elements),
            mark_elements: overrides.mark_elements.unwrap_or(defaults.mark_elements),
        }
    }
}

impl ClassificationTables {
    /// Resolve a lookup key, falling back to the `p` entry and then to `paragraph`.
    pub fn element_type(&self, key: &str) -> ElementType {
        self.elements
            .get(key)
            .or_else(|| self.elements.get(FALLBACK_KEY))
            .cloned()
            .unwrap_or_else(|| ElementType::from(PARAGRAPH))
    }

    pub fn is_block(&self, name: &str) -> bool {
        self.block_elements.contains(name)
    }

    pub fn is_inline(&self, name: &str) -> bool {
        self.inline_elements.contains(name)
    }

    /// Mark applied by a tag. An entry naming [`RESERVED_MARK`] is ignored.
    pub fn mark(&self, name: &str) -> Option<&str> {
        self.mark_elements
            .get(name)
            .map(String::as_str)
            .filter(|mark| *mark != RESERVED_MARK)
    }
}

/// Tag to write for a node type, by reverse lookup in [`DEFAULT_ELEMENTS`].
///
/// Ordered lists always come out as `ol`.
pub fn tag_for_type(kind: &str) -> Option<&'static str> {
    if kind == ORDERED_LIST {
        return Some(ORDERED_LIST_TAG);
    }
    DEFAULT_ELEMENTS
        .iter()
        .find(|(_, mapped)| *mapped == kind)
        .map(|(tag, _)| *tag)
}

fn default_elements() -> HashMap<String, ElementType> {
    DEFAULT_ELEMENTS
        .iter()
        .map(|(tag, kind)| (tag.to_string(), ElementType::from(*kind)))
        .collect()
}

fn to_set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}
