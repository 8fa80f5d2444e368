//! Emphasis markers left in text.
//!
//! `**bold**` and `_italic_` that reached the tree as literal text (from
//! titles, frontmatter strings or escaped Markdown) are split into `strong` /
//! `em` elements.

use crate::merge::is_opaque;
use quire_core::{Element, Node, QuireError, Root};
use std::str::FromStr;

/// The element produced by emphasis conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmphasisKind {
    /// `**text**` to `<strong>`.
    Strong,
    /// `_text_` to `<em>`.
    Emphasis,
}

impl EmphasisKind {
    /// Tag name of the produced element.
    pub fn tag_name(self) -> &'static str {
        match self {
            EmphasisKind::Strong => "strong",
            EmphasisKind::Emphasis => "em",
        }
    }

    /// Delimiter surrounding the emphasized text.
    pub fn delimiter(self) -> &'static str {
        match self {
            EmphasisKind::Strong => "**",
            EmphasisKind::Emphasis => "_",
        }
    }
}

impl FromStr for EmphasisKind {
    type Err = QuireError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "strong" => Ok(EmphasisKind::Strong),
            "em" => Ok(EmphasisKind::Emphasis),
            other => Err(QuireError::UnknownEmphasisTag(other.to_string())),
        }
    }
}

/// Converts both kinds, strong first.
pub fn convert_all_emphasis(root: &mut Root) {
    convert_emphasis(root, EmphasisKind::Strong);
    convert_emphasis(root, EmphasisKind::Emphasis);
}

/// Converts literal emphasis markers of one kind throughout the tree.
pub fn convert_emphasis(root: &mut Root, kind: EmphasisKind) {
    convert_children(&mut root.children, kind);
}

/// Like `convert_emphasis`, naming the kind by tag (`strong` or `em`).
pub fn convert_emphasis_tag(root: &mut Root, tag: &str) -> Result<(), QuireError> {
    convert_emphasis(root, tag.parse()?);
    Ok(())
}

fn convert_children(children: &mut Vec<Node>, kind: EmphasisKind) {
    let mut index = 0;
    while index < children.len() {
        let replacement = match &mut children[index] {
            Node::Text(text) => split_emphasis(&text.value, kind),
            Node::Element(element) => {
                if !is_opaque(element) {
                    convert_children(&mut element.children, kind);
                }
                None
            }
            Node::Comment(_) | Node::Doctype => None,
        };

        match replacement {
            Some(nodes) => {
                let count = nodes.len();
                children.splice(index..=index, nodes);
                index += count;
            }
            None => index += 1,
        }
    }
}

/// Splits `text` around `kind` markers, or returns `None` if it has none.
///
/// Matching is non-greedy and left to right. An opening marker needs a
/// non-space character after it and a closing marker a non-space character
/// before it; `_` markers must not sit inside a word.
///
/// ```
/// use quire_core::Node;
/// use quire_typography::emphasis::{EmphasisKind, split_emphasis};
///
/// let nodes = split_emphasis("a **b** c", EmphasisKind::Strong).unwrap();
/// assert_eq!(nodes.len(), 3);
/// assert_eq!(nodes[0], Node::text("a "));
/// ```
pub fn split_emphasis(text: &str, kind: EmphasisKind) -> Option<Vec<Node>> {
    let delimiter = kind.delimiter();
    if !text.contains(delimiter) {
        return None;
    }

    let mut nodes = Vec::new();
    let mut plain_start = 0;
    let mut search = 0;
    while let Some(found) = text[search..].find(delimiter) {
        let open = search + found;
        let content_start = open + delimiter.len();
        if !opens(text, open, content_start, kind) {
            search = open + next_char_len(text, open);
            continue;
        }
        let Some(close) = find_close(text, content_start, kind) else {
            search = open + next_char_len(text, open);
            continue;
        };

        if plain_start < open {
            nodes.push(Node::text(&text[plain_start..open]));
        }
        nodes.push(
            Element::new(kind.tag_name())
                .with_child(Node::text(&text[content_start..close]))
                .into(),
        );
        plain_start = close + delimiter.len();
        search = plain_start;
    }

    if nodes.is_empty() {
        return None;
    }
    if plain_start < text.len() {
        nodes.push(Node::text(&text[plain_start..]));
    }
    Some(nodes)
}

fn opens(text: &str, open: usize, content_start: usize, kind: EmphasisKind) -> bool {
    let after = text[content_start..].chars().next();
    if !after.is_some_and(|c| !c.is_whitespace()) {
        return false;
    }
    match kind {
        EmphasisKind::Strong => true,
        EmphasisKind::Emphasis => !text[..open].chars().next_back().is_some_and(is_word_char),
    }
}

fn find_close(text: &str, content_start: usize, kind: EmphasisKind) -> Option<usize> {
    let delimiter = kind.delimiter();
    let mut search = content_start;
    while let Some(found) = text[search..].find(delimiter) {
        let close = search + found;
        let before = text[..close].chars().next_back();
        let after = text[close + delimiter.len()..].chars().next();
        let closes = close > content_start
            && before.is_some_and(|c| !c.is_whitespace())
            && match kind {
                EmphasisKind::Strong => true,
                EmphasisKind::Emphasis => !after.is_some_and(is_word_char),
            };
        if closes {
            return Some(close);
        }
        search = close + next_char_len(text, close);
    }
    None
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn next_char_len(text: &str, index: usize) -> usize {
    text[index..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_core::to_html;

    fn html(text: &str) -> String {
        let mut root = Root::new(vec![
            Element::new("p").with_child(Node::text(text)).into(),
        ]);
        convert_all_emphasis(&mut root);
        to_html(&root)
    }

    #[test]
    fn bold_and_italic_in_one_node() {
        let mut root = Root::new(vec![
            Element::new("p")
                .with_child(Node::text("this is **bold** and _italic_"))
                .into(),
        ]);
        convert_all_emphasis(&mut root);

        let Node::Element(paragraph) = &root.children[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(paragraph.children.len(), 4);
        assert_eq!(paragraph.children[0], Node::text("this is "));
        assert_eq!(
            paragraph.children[1],
            Node::from(Element::new("strong").with_child(Node::text("bold")))
        );
        assert_eq!(paragraph.children[2], Node::text(" and "));
        assert_eq!(
            paragraph.children[3],
            Node::from(Element::new("em").with_child(Node::text("italic")))
        );
    }

    #[test]
    fn matching_is_non_greedy() {
        assert_eq!(
            html("**a** and **b**"),
            "<p><strong>a</strong> and <strong>b</strong></p>"
        );
    }

    #[test]
    fn nested_italic_inside_bold() {
        assert_eq!(
            html("**very _much_ so**"),
            "<p><strong>very <em>much</em> so</strong></p>"
        );
    }

    #[test]
    fn intraword_underscores_stay() {
        assert_eq!(html("snake_case_name"), "<p>snake_case_name</p>");
        assert_eq!(html("a _b_c d"), "<p>a _b_c d</p>");
    }

    #[test]
    fn spaced_markers_stay() {
        assert_eq!(html("2 ** 3 ** 4"), "<p>2 ** 3 ** 4</p>");
        assert_eq!(html("_ a _"), "<p>_ a _</p>");
        assert_eq!(html("****"), "<p>****</p>");
    }

    #[test]
    fn unclosed_marker_is_plain_text() {
        assert_eq!(html("**open and _done_"), "<p>**open and <em>done</em></p>");
    }

    #[test]
    fn code_is_skipped() {
        let mut root = Root::new(vec![
            Element::new("code").with_child(Node::text("**x**")).into(),
        ]);
        convert_all_emphasis(&mut root);
        assert_eq!(to_html(&root), "<code>**x**</code>");
    }

    #[test]
    fn unknown_tag_fails_fast() {
        let mut root = Root::default();
        let err = convert_emphasis_tag(&mut root, "b").unwrap_err();
        assert!(matches!(err, QuireError::UnknownEmphasisTag(tag) if tag == "b"));
        assert!(convert_emphasis_tag(&mut root, "em").is_ok());
    }
}
