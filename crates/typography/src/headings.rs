//! Heading ids and table-of-contents entries.

use crate::toc::TocEntry;
use quire_core::{Element, Node, Root, Slugger, extract_custom_id};

/// Gives every heading an `id` and returns the headings in document order.
///
/// A trailing `{#custom-id}` in the heading text becomes the id and is removed
/// from the text; an existing `id` attribute is kept. Other headings get a
/// unique slug of their text. With `autolinks`, heading content is wrapped in
/// a link to the heading unless it already contains one.
pub fn collect_headings(root: &mut Root, autolinks: bool) -> Vec<TocEntry> {
    let mut slugger = Slugger::new();
    let mut entries = Vec::new();
    root.visit_elements_mut(&mut |element| {
        if let Some(depth) = element.heading_depth() {
            let entry = assign_heading_id(element, depth, &mut slugger);
            if autolinks && !contains_link(&element.children) {
                let children = std::mem::take(&mut element.children);
                let link = Element::new("a")
                    .with_attr("href", format!("#{}", entry.slug))
                    .with_children(children);
                element.children.push(link.into());
            }
            entries.push(entry);
        }
    });
    entries
}

/// Moves trailing `{#custom-id}` suffixes into heading `id` attributes.
///
/// Run before the text rules so ids like `{#part--2}` are not rewritten.
pub fn apply_custom_ids(root: &mut Root) {
    root.visit_elements_mut(&mut |element| {
        if element.heading_depth().is_some()
            && let Some(id) = strip_custom_id(element)
        {
            element.properties.insert("id".into(), id);
        }
    });
}

fn assign_heading_id(heading: &mut Element, depth: u8, slugger: &mut Slugger) -> TocEntry {
    let custom_id = strip_custom_id(heading);
    let slug = match (custom_id, heading.attr("id")) {
        (Some(id), _) => {
            slugger.reserve(&id);
            id
        }
        (None, Some(id)) => {
            let id = id.to_string();
            slugger.reserve(&id);
            id
        }
        (None, None) => slugger.next_slug(heading.text_content().trim()),
    };
    heading.properties.insert("id".into(), slug.clone());

    TocEntry {
        depth,
        text: heading_text(heading),
        slug,
    }
}

/// Removes `{#id}` from the last text leaf of the heading.
fn strip_custom_id(heading: &mut Element) -> Option<String> {
    let value = last_text_mut(&mut heading.children)?;
    let (text, id) = extract_custom_id(value);
    let id = id?.to_string();
    let text = text.to_string();
    *value = text;
    Some(id)
}

fn last_text_mut(nodes: &mut [Node]) -> Option<&mut String> {
    match nodes.last_mut()? {
        Node::Text(text) => Some(&mut text.value),
        Node::Element(element) => last_text_mut(&mut element.children),
        Node::Comment(_) | Node::Doctype => None,
    }
}

/// Heading text for the table of contents, with inline math as `$...$`.
pub fn heading_text(heading: &Element) -> String {
    let mut text = String::new();
    push_heading_text(&heading.children, &mut text);
    text.trim().to_string()
}

fn push_heading_text(nodes: &[Node], buffer: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => buffer.push_str(&text.value),
            Node::Element(element) if element.has_class("math-inline") => {
                buffer.push('$');
                buffer.push_str(&element.text_content());
                buffer.push('$');
            }
            Node::Element(element) => push_heading_text(&element.children, buffer),
            Node::Comment(_) | Node::Doctype => {}
        }
    }
}

fn contains_link(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Element(element) => element.tag_name == "a" || contains_link(&element.children),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_core::to_html;

    fn heading(tag: &str, children: Vec<Node>) -> Node {
        Element::new(tag).with_children(children).into()
    }

    #[test]
    fn slugs_are_unique_per_document() {
        let mut root = Root::new(vec![
            heading("h1", vec![Node::text("Intro")]),
            heading("h2", vec![Node::text("Intro")]),
        ]);
        let entries = collect_headings(&mut root, false);
        assert_eq!(
            entries,
            vec![TocEntry::new(1, "Intro", "intro"), TocEntry::new(2, "Intro", "intro-1")]
        );
        assert_eq!(to_html(&root), r#"<h1 id="intro">Intro</h1><h2 id="intro-1">Intro</h2>"#);
    }

    #[test]
    fn custom_id_is_stripped_and_reserved() {
        let mut root = Root::new(vec![
            heading(
                "h2",
                vec![
                    Node::text("Set "),
                    Element::new("em").with_child(Node::text("up {#setup}")).into(),
                ],
            ),
            heading("h2", vec![Node::text("Setup")]),
        ]);
        let entries = collect_headings(&mut root, false);
        assert_eq!(entries[0], TocEntry::new(2, "Set up", "setup"));
        assert_eq!(entries[1].slug, "setup-1");
        assert_eq!(
            to_html(&root),
            r#"<h2 id="setup">Set <em>up</em></h2><h2 id="setup-1">Setup</h2>"#
        );
    }

    #[test]
    fn custom_ids_can_be_applied_first() {
        let mut root = Root::new(vec![heading("h2", vec![Node::text("Part 2 {#part--2}")])]);
        apply_custom_ids(&mut root);
        assert_eq!(to_html(&root), r#"<h2 id="part--2">Part 2</h2>"#);

        let entries = collect_headings(&mut root, false);
        assert_eq!(entries, vec![TocEntry::new(2, "Part 2", "part--2")]);
    }

    #[test]
    fn math_is_kept_for_the_toc() {
        let mut root = Root::new(vec![heading(
            "h3",
            vec![
                Node::text("Bounding "),
                Element::new("span")
                    .with_class("math")
                    .with_class("math-inline")
                    .with_child(Node::text("x^2"))
                    .into(),
            ],
        )]);
        let entries = collect_headings(&mut root, false);
        assert_eq!(entries[0].text, "Bounding $x^2$");
        assert_eq!(entries[0].slug, "bounding-x2");
    }

    #[test]
    fn autolinks_wrap_heading_content() {
        let mut root = Root::new(vec![
            heading("h2", vec![Node::text("Plain")]),
            heading(
                "h2",
                vec![
                    Element::new("a")
                        .with_attr("href", "/x")
                        .with_child(Node::text("Linked"))
                        .into(),
                ],
            ),
        ]);
        collect_headings(&mut root, true);
        assert_eq!(
            to_html(&root),
            r##"<h2 id="plain"><a href="#plain">Plain</a></h2><h2 id="linked"><a href="/x">Linked</a></h2>"##
        );
    }
}
