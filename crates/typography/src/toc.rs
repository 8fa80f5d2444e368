//! Table of contents.

use crate::small_caps::small_caps;
use quire_core::{Element, Node};
use serde::{Deserialize, Serialize};

/// One heading as listed in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading level, 1 to 6.
    pub depth: u8,
    /// Heading text; `$...$` marks inline math.
    pub text: String,
    /// Target element id.
    pub slug: String,
}

impl TocEntry {
    /// Creates an entry.
    pub fn new(depth: u8, text: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            depth,
            text: text.into(),
            slug: slug.into(),
        }
    }
}

/// Builds `nav.toc > ol`, or `None` when there are no entries.
pub fn build_toc(entries: &[TocEntry]) -> Option<Element> {
    let list = toc_list(entries)?;
    Some(Element::new("nav").with_class("toc").with_child(list))
}

/// Builds the nested `ol` for `entries`.
///
/// The shallowest depth present is the top level. An entry deeper than the
/// one before it opens a sublist inside the previous item; a shallower entry
/// closes sublists until its own level.
pub fn toc_list(entries: &[TocEntry]) -> Option<Element> {
    let top = entries.iter().map(|entry| entry.depth).min()?;
    let mut index = 0;
    let items = build_items(entries, &mut index, top);
    Some(Element::new("ol").with_children(items))
}

fn build_items(entries: &[TocEntry], index: &mut usize, depth: u8) -> Vec<Node> {
    let mut items: Vec<Node> = Vec::new();
    while let Some(entry) = entries.get(*index) {
        if entry.depth < depth {
            break;
        }
        if entry.depth > depth {
            let sublist = Node::from(
                Element::new("ol").with_children(build_items(entries, index, depth + 1)),
            );
            match items.last_mut() {
                Some(Node::Element(item)) => item.children.push(sublist),
                _ => items.push(Element::new("li").with_child(sublist).into()),
            }
            continue;
        }
        items.push(toc_item(entry).into());
        *index += 1;
    }
    items
}

fn toc_item(entry: &TocEntry) -> Element {
    let link = Element::new("a")
        .with_attr("href", format!("#{}", entry.slug))
        .with_children(render_toc_text(&entry.text));
    Element::new("li").with_child(link)
}

/// Heading text as TOC link content: `$...$` becomes inline math, the rest
/// goes through small caps.
pub fn render_toc_text(text: &str) -> Vec<Node> {
    let segments: Vec<&str> = text.split('$').collect();
    // An odd number of `$` leaves the last math segment unclosed.
    if segments.len() % 2 == 0 {
        return small_caps(text);
    }

    let mut nodes = Vec::new();
    for (position, segment) in segments.into_iter().enumerate() {
        if position % 2 == 1 {
            nodes.push(
                Element::new("span")
                    .with_class("math")
                    .with_class("math-inline")
                    .with_child(Node::text(segment))
                    .into(),
            );
        } else if !segment.is_empty() {
            nodes.extend(small_caps(segment));
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_core::element_to_html;

    fn entries(list: &[(u8, &str)]) -> Vec<TocEntry> {
        list.iter()
            .map(|(depth, text)| TocEntry::new(*depth, *text, text.to_lowercase()))
            .collect()
    }

    #[test]
    fn nests_deeper_entries_under_previous_item() {
        let list = toc_list(&entries(&[(1, "A"), (2, "B"), (1, "C")])).unwrap();
        assert_eq!(list.children.len(), 2);

        let Node::Element(first) = &list.children[0] else {
            panic!("expected li");
        };
        let Some(Node::Element(sublist)) = first.children.get(1) else {
            panic!("expected nested list");
        };
        assert_eq!(sublist.tag_name, "ol");
        assert_eq!(sublist.children.len(), 1);
        assert_eq!(sublist.text_content(), "B");

        assert_eq!(
            element_to_html(&list),
            "<ol><li><a href=\"#a\">A</a><ol><li><a href=\"#b\">B</a></li></ol></li>\
             <li><a href=\"#c\">C</a></li></ol>"
        );
    }

    #[test]
    fn skipped_levels_and_deeper_start() {
        let list = toc_list(&entries(&[(3, "Deep"), (2, "Up"), (4, "Down")])).unwrap();
        assert_eq!(
            element_to_html(&list),
            "<ol><li><ol><li><a href=\"#deep\">Deep</a></li></ol></li>\
             <li><a href=\"#up\">Up</a><ol><li><ol><li><a href=\"#down\">Down</a></li></ol></li></ol></li></ol>"
        );
    }

    #[test]
    fn empty_toc() {
        assert!(build_toc(&[]).is_none());
    }

    #[test]
    fn nav_wrapper() {
        let nav = build_toc(&entries(&[(2, "Only")])).unwrap();
        assert_eq!(
            element_to_html(&nav),
            "<nav class=\"toc\"><ol><li><a href=\"#only\">Only</a></li></ol></nav>"
        );
    }

    #[test]
    fn math_and_acronyms_in_titles() {
        let nodes = render_toc_text("Why $x^2$ helps RL");
        let html: String = nodes
            .iter()
            .map(|node| match node {
                Node::Element(element) => element_to_html(element),
                Node::Text(text) => text.value.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(
            html,
            "Why <span class=\"math math-inline\">x^2</span> helps <abbr class=\"small-caps\">RL</abbr>"
        );
        assert_eq!(render_toc_text("costs $5"), vec![Node::text("costs $5")]);
    }
}
