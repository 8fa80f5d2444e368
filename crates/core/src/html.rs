//! HTML serialization for document trees.

use crate::hast::{Element, Node, Root};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Whether `element` is void (`br`, `img`, ...): no children, no closing tag.
pub fn is_void(element: &Element) -> bool {
    VOID_ELEMENTS.contains(&element.tag_name.as_str())
}

/// Serializes a document root to an HTML fragment.
pub fn to_html(root: &Root) -> String {
    let mut out = String::new();
    write_nodes(&root.children, &mut out);
    out
}

/// Serializes a single element (including its own tag) to HTML.
pub fn element_to_html(element: &Element) -> String {
    let mut out = String::new();
    write_element(element, &mut out);
    out
}

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(element) => write_element(element, out),
            Node::Text(text) => out.push_str(&html_escape::encode_text(&text.value)),
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(&comment.value);
                out.push_str("-->");
            }
            Node::Doctype => out.push_str("<!doctype html>"),
        }
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag_name);
    for (name, value) in &element.properties {
        out.push(' ');
        out.push_str(name);
        if value.is_empty() {
            continue;
        }
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');

    if is_void(element) {
        return;
    }

    write_nodes(&element.children, out);
    out.push_str("</");
    out.push_str(&element.tag_name);
    out.push('>');
}
