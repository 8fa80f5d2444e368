//! HTML-like document tree.
//!
//! The tree is a closed set of node variants. Passes that rewrite text only ever
//! change `Text::value`; structural passes (emphasis, headings, TOC) build new
//! nodes with the helpers below.

use serde::Serialize;
use std::collections::BTreeMap;

/// Element attributes, keyed by HTML attribute name (`class`, `href`, ...).
pub type Properties = BTreeMap<String, String>;

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    /// An element with ordered children.
    Element(Element),
    /// A text leaf.
    Text(Text),
    /// An HTML comment.
    Comment(Comment),
    /// A `<!doctype html>` declaration.
    Doctype,
}

impl Node {
    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text {
            value: value.into(),
        })
    }

    /// Creates a comment node.
    pub fn comment(value: impl Into<String>) -> Self {
        Node::Comment(Comment {
            value: value.into(),
        })
    }

    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the text value if this node is a text leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(&text.value),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// A text leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    /// Text content, unescaped.
    pub value: String,
}

/// An HTML comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Comment body.
    pub value: String,
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Lowercase tag name.
    pub tag_name: String,
    /// Attributes.
    pub properties: Properties,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: Properties::new(),
            children: Vec::new(),
        }
    }

    /// Sets an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Appends a class name to the `class` attribute.
    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Appends one child.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Replaces the children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Appends a class name to the `class` attribute.
    pub fn add_class(&mut self, class: &str) {
        match self.properties.get_mut("class") {
            Some(existing) if !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(class);
            }
            _ => {
                self.properties.insert("class".into(), class.into());
            }
        }
    }

    /// Returns an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Returns true if the attribute is present.
    pub fn has_attr(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Iterates the whitespace-separated class names.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Returns true if the element carries the given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Heading level for `h1`..`h6`.
    pub fn heading_depth(&self) -> Option<u8> {
        match self.tag_name.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    /// Concatenated text of all descendant text leaves.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        collect_text(&self.children, &mut buffer);
        buffer
    }
}

/// The document root.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Root {
    /// Top-level nodes.
    pub children: Vec<Node>,
}

impl Root {
    /// Creates a root from its children.
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Concatenated text of all text leaves in the document.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        collect_text(&self.children, &mut buffer);
        buffer
    }

    /// Visits every element depth-first, parents before children.
    pub fn visit_elements_mut(&mut self, visitor: &mut dyn FnMut(&mut Element)) {
        visit_elements_mut(&mut self.children, visitor);
    }
}

fn collect_text(nodes: &[Node], buffer: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => buffer.push_str(&text.value),
            Node::Element(element) => collect_text(&element.children, buffer),
            Node::Comment(_) | Node::Doctype => {}
        }
    }
}

fn visit_elements_mut(nodes: &mut [Node], visitor: &mut dyn FnMut(&mut Element)) {
    for node in nodes {
        if let Node::Element(element) = node {
            visitor(element);
            visit_elements_mut(&mut element.children, visitor);
        }
    }
}

/// Tags whose text is merged and rewritten as one unit.
///
/// Text leaves belong to their nearest enclosing block; a nested block starts a
/// new unit.
pub const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "section",
    "summary",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

/// Returns true if the element starts its own text unit.
pub fn is_block(element: &Element) -> bool {
    BLOCK_TAGS.contains(&element.tag_name.as_str())
}
