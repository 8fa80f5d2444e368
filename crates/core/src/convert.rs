//! Conversion from markdown-rs MDAST to the document tree.
//!
//! Follows the usual mdast-to-hast mapping. Footnote definitions are collected
//! into a trailing `section.footnotes`, numbered by first reference. Node types
//! with no HTML counterpart are reported and replaced by an empty comment.

use crate::error::{Diagnostics, SourceLocation, Warning};
use crate::hast::{Element, Node, Root};
use markdown::mdast::{self, AlignKind};
use std::collections::HashMap;

/// Converts a parsed MDAST root into a document tree.
pub fn mdast_to_tree(node: &mdast::Node, diagnostics: &mut Diagnostics) -> Root {
    let mut converter = Converter::new(node, diagnostics);
    let top_level = node.children().map_or(&[][..], |c| c.as_slice());
    let mut children = converter.convert_children(top_level);
    if let Some(footnotes) = converter.footnote_section() {
        children.push(footnotes.into());
    }
    Root::new(children)
}

struct Converter<'a, 'd> {
    definitions: HashMap<&'a str, &'a mdast::Definition>,
    footnote_definitions: HashMap<&'a str, &'a mdast::FootnoteDefinition>,
    /// Footnote identifiers in order of first reference.
    footnote_order: Vec<&'a str>,
    /// How many times each footnote has been referenced so far.
    footnote_refs: HashMap<&'a str, usize>,
    diagnostics: &'d mut Diagnostics,
}

impl<'a, 'd> Converter<'a, 'd> {
    fn new(root: &'a mdast::Node, diagnostics: &'d mut Diagnostics) -> Self {
        let mut converter = Self {
            definitions: HashMap::new(),
            footnote_definitions: HashMap::new(),
            footnote_order: Vec::new(),
            footnote_refs: HashMap::new(),
            diagnostics,
        };
        converter.collect_definitions(root);
        converter
    }

    fn collect_definitions(&mut self, node: &'a mdast::Node) {
        match node {
            mdast::Node::Definition(def) => {
                self.definitions.entry(def.identifier.as_str()).or_insert(def);
            }
            mdast::Node::FootnoteDefinition(def) => {
                self.footnote_definitions
                    .entry(def.identifier.as_str())
                    .or_insert(def);
            }
            _ => {}
        }
        if let Some(children) = node.children() {
            for child in children {
                self.collect_definitions(child);
            }
        }
    }

    fn convert_children(&mut self, nodes: &'a [mdast::Node]) -> Vec<Node> {
        nodes.iter().filter_map(|node| self.convert(node)).collect()
    }

    fn element(&mut self, tag: &str, children: &'a [mdast::Node]) -> Element {
        Element::new(tag).with_children(self.convert_children(children))
    }

    fn convert(&mut self, node: &'a mdast::Node) -> Option<Node> {
        let converted: Node = match node {
            mdast::Node::Text(text) => Node::text(&text.value),
            mdast::Node::Paragraph(p) => self.element("p", &p.children).into(),
            mdast::Node::Heading(h) => {
                let tag = format!("h{}", h.depth.clamp(1, 6));
                self.element(&tag, &h.children).into()
            }
            mdast::Node::Emphasis(e) => self.element("em", &e.children).into(),
            mdast::Node::Strong(s) => self.element("strong", &s.children).into(),
            mdast::Node::Delete(d) => self.element("del", &d.children).into(),
            mdast::Node::Blockquote(b) => self.element("blockquote", &b.children).into(),
            mdast::Node::InlineCode(code) => Element::new("code")
                .with_child(Node::text(&code.value))
                .into(),
            mdast::Node::Code(code) => {
                let mut inner = Element::new("code");
                if let Some(lang) = &code.lang {
                    inner.add_class(&format!("language-{}", lang));
                }
                let inner = inner.with_child(Node::text(format!("{}\n", code.value)));
                Element::new("pre").with_child(inner).into()
            }
            mdast::Node::InlineMath(math) => Element::new("span")
                .with_class("math")
                .with_class("math-inline")
                .with_child(Node::text(&math.value))
                .into(),
            mdast::Node::Math(math) => Element::new("div")
                .with_class("math")
                .with_class("math-display")
                .with_child(Node::text(&math.value))
                .into(),
            mdast::Node::Break(_) => Element::new("br").into(),
            mdast::Node::ThematicBreak(_) => Element::new("hr").into(),
            mdast::Node::Link(link) => {
                link_element(&link.url, link.title.as_deref())
                    .with_children(self.convert_children(&link.children))
                    .into()
            }
            mdast::Node::LinkReference(reference) => {
                let children = self.convert_children(&reference.children);
                match self.definitions.get(reference.identifier.as_str()) {
                    Some(def) => link_element(&def.url, def.title.as_deref())
                        .with_children(children)
                        .into(),
                    None => Element::new("span").with_children(children).into(),
                }
            }
            mdast::Node::Image(image) => {
                image_element(&image.url, &image.alt, image.title.as_deref()).into()
            }
            mdast::Node::ImageReference(reference) => {
                match self.definitions.get(reference.identifier.as_str()) {
                    Some(def) => {
                        image_element(&def.url, &reference.alt, def.title.as_deref()).into()
                    }
                    None => Node::text(&reference.alt),
                }
            }
            mdast::Node::List(list) => self.convert_list(list).into(),
            mdast::Node::Table(table) => self.convert_table(table).into(),
            mdast::Node::FootnoteReference(reference) => {
                self.footnote_reference(&reference.identifier).into()
            }
            // Metadata nodes: handled elsewhere or rendered at the end.
            mdast::Node::Definition(_)
            | mdast::Node::FootnoteDefinition(_)
            | mdast::Node::Yaml(_)
            | mdast::Node::Toml(_) => return None,
            other => self.unsupported(other),
        };
        Some(converted)
    }

    fn unsupported(&mut self, node: &mdast::Node) -> Node {
        let debug = format!("{:?}", node);
        let kind = debug.split(['(', ' ', '{']).next().unwrap_or("unknown");
        let location = node
            .position()
            .map(|p| SourceLocation::new(p.start.line, p.start.column));
        self.diagnostics.warn(Warning::UnsupportedNode {
            kind: kind.to_string(),
            location,
        });
        Node::comment("")
    }

    fn convert_list(&mut self, list: &'a mdast::List) -> Element {
        let loose = list.spread
            || list
                .children
                .iter()
                .any(|child| matches!(child, mdast::Node::ListItem(item) if item.spread));

        let mut element = Element::new(if list.ordered { "ol" } else { "ul" });
        if list.ordered
            && let Some(start) = list.start
            && start != 1
        {
            element = element.with_attr("start", start.to_string());
        }

        for child in &list.children {
            let item = match child {
                mdast::Node::ListItem(item) => self.convert_list_item(item, loose),
                other => match self.convert(other) {
                    Some(node) => node,
                    None => continue,
                },
            };
            element.children.push(item);
        }
        element
    }

    fn convert_list_item(&mut self, item: &'a mdast::ListItem, loose: bool) -> Node {
        let mut li = Element::new("li");
        for child in &item.children {
            match child {
                mdast::Node::Paragraph(p) if !loose => {
                    let inline = self.convert_children(&p.children);
                    li.children.extend(inline);
                }
                other => {
                    if let Some(node) = self.convert(other) {
                        li.children.push(node);
                    }
                }
            }
        }

        if let Some(checked) = item.checked {
            li.add_class("task-list-item");
            let mut checkbox = Element::new("input")
                .with_attr("type", "checkbox")
                .with_attr("disabled", "");
            if checked {
                checkbox = checkbox.with_attr("checked", "");
            }
            let prefix = [checkbox.into(), Node::text(" ")];
            match li.children.first_mut() {
                Some(Node::Element(p)) if p.tag_name == "p" => {
                    p.children.splice(0..0, prefix);
                }
                _ => {
                    li.children.splice(0..0, prefix);
                }
            }
        }
        li.into()
    }

    fn convert_table(&mut self, table: &'a mdast::Table) -> Element {
        let mut rows = table.children.iter().filter_map(|row| match row {
            mdast::Node::TableRow(row) => Some(row),
            _ => None,
        });

        let mut element = Element::new("table");
        if let Some(head) = rows.next() {
            let tr = self.convert_row(head, "th", &table.align);
            element
                .children
                .push(Element::new("thead").with_child(tr).into());
        }

        let body: Vec<Node> = rows
            .map(|row| self.convert_row(row, "td", &table.align).into())
            .collect();
        if !body.is_empty() {
            element
                .children
                .push(Element::new("tbody").with_children(body).into());
        }
        element
    }

    fn convert_row(
        &mut self,
        row: &'a mdast::TableRow,
        cell_tag: &str,
        align: &[AlignKind],
    ) -> Element {
        let mut tr = Element::new("tr");
        for (index, cell) in row.children.iter().enumerate() {
            let mdast::Node::TableCell(cell) = cell else {
                continue;
            };
            let mut td = self.element(cell_tag, &cell.children);
            let align = match align.get(index) {
                Some(AlignKind::Left) => Some("left"),
                Some(AlignKind::Right) => Some("right"),
                Some(AlignKind::Center) => Some("center"),
                Some(AlignKind::None) | None => None,
            };
            if let Some(align) = align {
                td = td.with_attr("align", align);
            }
            tr.children.push(td.into());
        }
        tr
    }

    fn footnote_reference(&mut self, identifier: &'a str) -> Element {
        let count = self.footnote_refs.entry(identifier).or_insert(0);
        *count += 1;
        let count = *count;
        if count == 1 {
            self.footnote_order.push(identifier);
        }
        let number = self
            .footnote_order
            .iter()
            .position(|id| *id == identifier)
            .map_or(0, |index| index + 1);

        let id = if count == 1 {
            format!("fnref-{}", identifier)
        } else {
            format!("fnref-{}-{}", identifier, count)
        };
        let anchor = Element::new("a")
            .with_attr("href", format!("#fn-{}", identifier))
            .with_attr("id", id)
            .with_attr("data-footnote-ref", "")
            .with_child(Node::text(number.to_string()));
        Element::new("sup").with_child(anchor)
    }

    /// Renders referenced footnote definitions; definitions can reference further
    /// footnotes, which are appended as they are discovered.
    fn footnote_section(&mut self) -> Option<Element> {
        let mut items = Vec::new();
        let mut index = 0;
        while index < self.footnote_order.len() {
            let identifier = self.footnote_order[index];
            index += 1;
            let Some(def) = self.footnote_definitions.get(identifier).copied() else {
                continue;
            };

            let mut li = self
                .element("li", &def.children)
                .with_attr("id", format!("fn-{}", identifier));
            let backref = Element::new("a")
                .with_attr("href", format!("#fnref-{}", identifier))
                .with_attr("data-footnote-backref", "")
                .with_class("footnote-backref")
                .with_child(Node::text("↩"));
            match li.children.last_mut() {
                Some(Node::Element(p)) if p.tag_name == "p" => {
                    p.children.push(Node::text(" "));
                    p.children.push(backref.into());
                }
                _ => li.children.push(backref.into()),
            }
            items.push(li.into());
        }

        if items.is_empty() {
            return None;
        }
        Some(
            Element::new("section")
                .with_class("footnotes")
                .with_attr("data-footnotes", "")
                .with_child(Element::new("ol").with_children(items)),
        )
    }
}

fn link_element(url: &str, title: Option<&str>) -> Element {
    let mut a = Element::new("a").with_attr("href", url);
    if let Some(title) = title {
        a = a.with_attr("title", title);
    }
    a
}

fn image_element(url: &str, alt: &str, title: Option<&str>) -> Element {
    let mut img = Element::new("img").with_attr("src", url).with_attr("alt", alt);
    if let Some(title) = title {
        img = img.with_attr("title", title);
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::to_html;
    use crate::parse::{ParseOptions, parse_mdast};

    fn render(markdown: &str) -> (String, Diagnostics) {
        let mdast = parse_mdast(markdown, &ParseOptions::default()).unwrap();
        let mut diagnostics = Diagnostics::new();
        let root = mdast_to_tree(&mdast, &mut diagnostics);
        (to_html(&root), diagnostics)
    }

    #[test]
    fn inline_markup() {
        let (html, diagnostics) = render("Some *em*, **strong**, ~~del~~ and `code`.");
        assert_eq!(
            html,
            "<p>Some <em>em</em>, <strong>strong</strong>, <del>del</del> and <code>code</code>.</p>"
        );
        assert!(!diagnostics.has_warnings());
    }

    #[test]
    fn tight_lists_unwrap_paragraphs() {
        let (html, _) = render("- one\n- two");
        assert_eq!(html, "<ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn loose_lists_keep_paragraphs() {
        let (html, _) = render("1. one\n\n2. two");
        assert_eq!(html, "<ol><li><p>one</p></li><li><p>two</p></li></ol>");
    }

    #[test]
    fn ordered_list_start_attribute() {
        let (html, _) = render("3. three\n4. four");
        assert_eq!(html, "<ol start=\"3\"><li>three</li><li>four</li></ol>");
    }

    #[test]
    fn task_items_get_checkboxes() {
        let (html, _) = render("- [x] done");
        assert_eq!(
            html,
            "<ul><li class=\"task-list-item\"><input checked disabled type=\"checkbox\"> done</li></ul>"
        );
    }

    #[test]
    fn code_blocks_and_math() {
        let (html, _) = render("```rust\nlet x = 1;\n```\n\n$$\nx^2\n$$");
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">let x = 1;\n</code></pre><div class=\"math math-display\">x^2</div>"
        );
    }

    #[test]
    fn reference_links_resolve_against_definitions() {
        let (html, _) = render("See [the post][post].\n\n[post]: https://example.com \"Post\"");
        assert_eq!(
            html,
            "<p>See <a href=\"https://example.com\" title=\"Post\">the post</a>.</p>"
        );
    }

    #[test]
    fn tables_with_alignment() {
        let (html, _) = render("| a | b |\n|:--|--:|\n| 1 | 2 |");
        assert_eq!(
            html,
            "<table><thead><tr><th align=\"left\">a</th><th align=\"right\">b</th></tr></thead><tbody><tr><td align=\"left\">1</td><td align=\"right\">2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn footnotes_are_numbered_by_reference() {
        let (html, _) = render("A[^b] and B[^a].\n\n[^a]: First.\n[^b]: Second.");
        assert!(html.starts_with(
            "<p>A<sup><a data-footnote-ref href=\"#fn-b\" id=\"fnref-b\">1</a></sup> and B<sup><a data-footnote-ref href=\"#fn-a\" id=\"fnref-a\">2</a></sup>.</p>"
        ));
        let b = html.find("<li id=\"fn-b\">").unwrap();
        let a = html.find("<li id=\"fn-a\">").unwrap();
        assert!(b < a);
        assert!(html.contains(
            "<p>Second. <a class=\"footnote-backref\" data-footnote-backref href=\"#fnref-b\">↩</a></p>"
        ));
    }

    #[test]
    fn unsupported_nodes_become_placeholders() {
        let mdast = mdast::Node::Root(mdast::Root {
            children: vec![mdast::Node::Html(mdast::Html {
                value: "<div>".into(),
                position: None,
            })],
            position: None,
        });
        let mut diagnostics = Diagnostics::new();
        let root = mdast_to_tree(&mdast, &mut diagnostics);

        assert_eq!(to_html(&root), "<!---->");
        assert_eq!(
            diagnostics.warnings(),
            &[Warning::UnsupportedNode {
                kind: "Html".into(),
                location: None,
            }]
        );
    }
}
