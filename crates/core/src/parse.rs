//! Markdown parsing pipeline and extension hooks.

use crate::convert::mdast_to_tree;
use crate::hast::Root;
use crate::{Diagnostics, QuireError, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};
use std::borrow::Cow;
use std::ops::Range;

/// Which Markdown constructs the parser recognises.
///
/// Raw HTML (flow and text) is always off, so no HTML nodes reach the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Tables, footnotes, strikethrough, task lists and literal autolinks.
    pub gfm: bool,
    /// A leading `---` YAML block.
    pub frontmatter: bool,
    /// Code blocks indented by four spaces.
    pub code_indented: bool,
    /// `$inline$` and `$$block$$` math.
    pub math: bool,
}

impl ParseOptions {
    /// Blog defaults: GFM, frontmatter and math on.
    pub const fn blog() -> Self {
        Self {
            gfm: true,
            frontmatter: true,
            code_indented: true,
            math: true,
        }
    }

    /// The markdown-rs options these settings stand for.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let constructs = markdown::Constructs {
            frontmatter: self.frontmatter,
            code_indented: self.code_indented,
            html_flow: false,
            html_text: false,
            gfm_autolink_literal: self.gfm,
            gfm_footnote_definition: self.gfm,
            gfm_label_start_footnote: self.gfm,
            gfm_strikethrough: self.gfm,
            gfm_table: self.gfm,
            gfm_task_list_item: self.gfm,
            math_flow: self.math,
            math_text: self.math,
            ..markdown::Constructs::default()
        };
        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::blog()
    }
}

/// Rewrites Markdown source before it is parsed.
pub trait TextTransform {
    /// Rewritten source, borrowed when nothing changed.
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (self)(input)
    }
}

/// Trait for rewriting the converted document tree.
pub trait TreeTransform {
    /// Mutate the tree in place. An error aborts the document.
    fn transform(&self, root: &mut Root, diagnostics: &mut Diagnostics) -> Result<(), QuireError>;
}

impl<F> TreeTransform for F
where
    F: Fn(&mut Root, &mut Diagnostics) -> Result<(), QuireError>,
{
    fn transform(&self, root: &mut Root, diagnostics: &mut Diagnostics) -> Result<(), QuireError> {
        (self)(root, diagnostics)
    }
}

/// Configurable parsing pipeline: text transforms, markdown-rs, tree conversion,
/// then tree transforms, in registration order.
pub struct ParserPipeline {
    options: markdown::ParseOptions,
    text_transforms: Vec<Box<dyn TextTransform>>,
    tree_transforms: Vec<Box<dyn TreeTransform>>,
}

impl ParserPipeline {
    /// Pipeline with no transforms.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options: options.to_markdown(),
            text_transforms: Vec::new(),
            tree_transforms: Vec::new(),
        }
    }

    /// Registers a source rewrite; they run in registration order.
    pub fn add_text_transform<T: TextTransform + 'static>(&mut self, transform: T) {
        self.text_transforms.push(Box::new(transform));
    }

    /// Registers a tree rewrite; they run in registration order.
    pub fn add_tree_transform<T: TreeTransform + 'static>(&mut self, transform: T) {
        self.tree_transforms.push(Box::new(transform));
    }

    /// Source rewrites, markdown-rs, conversion, then tree rewrites.
    pub fn parse(&self, input: &str, diagnostics: &mut Diagnostics) -> Result<Root, QuireError> {
        let mut source = Cow::Borrowed(input);
        for transform in &self.text_transforms {
            let rewritten = match transform.transform(&source) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(rewritten) => rewritten,
            };
            source = Cow::Owned(rewritten);
        }

        let mdast = parse_mdast_with_options(&source, &self.options)?;
        let mut root = mdast_to_tree(&mdast, diagnostics);
        for transform in &self.tree_transforms {
            transform.transform(&mut root, diagnostics)?;
        }

        Ok(root)
    }
}

/// Parses to MDAST with quire's options.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, QuireError> {
    parse_mdast_with_options(input, &options.to_markdown())
}

/// Parses to MDAST with raw markdown-rs options.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<Node, QuireError> {
    markdown::to_mdast(input, options).map_err(|err| QuireError::Parse {
        message: err.to_string(),
        location: message_location(&err),
    })
}

/// Byte ranges of code and math in `input`, in document order.
///
/// Covers fenced and indented code blocks (also inside block quotes and
/// lists), code spans and math, as markdown-rs sees them.
pub fn code_ranges(input: &str, options: &ParseOptions) -> Result<Vec<Range<usize>>, QuireError> {
    let mdast = parse_mdast(input, options)?;
    let mut ranges = Vec::new();
    collect_code_ranges(&mdast, &mut ranges);
    ranges.sort_by_key(|range| range.start);
    Ok(ranges)
}

fn collect_code_ranges(node: &Node, ranges: &mut Vec<Range<usize>>) {
    match node {
        Node::Code(_) | Node::InlineCode(_) | Node::Math(_) | Node::InlineMath(_) => {
            if let Some(position) = node.position() {
                ranges.push(position.start.offset..position.end.offset);
            }
        }
        _ => {
            for child in node.children().into_iter().flatten() {
                collect_code_ranges(child, ranges);
            }
        }
    }
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::to_html;

    fn finish_todos(input: &str) -> Cow<'_, str> {
        Cow::Owned(input.replace("TODO", "done"))
    }

    fn clear_document(root: &mut Root, _: &mut Diagnostics) -> Result<(), QuireError> {
        root.children.clear();
        Ok(())
    }

    fn reject_empty(root: &mut Root, _: &mut Diagnostics) -> Result<(), QuireError> {
        if root.children.is_empty() {
            return Err(QuireError::Internal("empty document".into()));
        }
        Ok(())
    }

    #[test]
    fn text_transforms_run_before_parsing() {
        let mut pipeline = ParserPipeline::new(ParseOptions::default());
        pipeline.add_text_transform(finish_todos);

        let root = pipeline
            .parse("TODO list", &mut Diagnostics::new())
            .unwrap();
        assert_eq!(to_html(&root), "<p>done list</p>");
    }

    #[test]
    fn tree_transforms_run_in_order_and_can_fail() {
        let mut pipeline = ParserPipeline::new(ParseOptions::default());
        pipeline.add_tree_transform(reject_empty);
        let root = pipeline.parse("Hello", &mut Diagnostics::new()).unwrap();
        assert_eq!(to_html(&root), "<p>Hello</p>");

        pipeline.add_tree_transform(clear_document);
        pipeline.add_tree_transform(reject_empty);
        let err = pipeline
            .parse("Hello", &mut Diagnostics::new())
            .unwrap_err();
        assert!(matches!(err, QuireError::Internal(_)));
    }

    #[test]
    fn code_ranges_cover_every_kind_of_code() {
        let input = "Para `a\nb` and $x$.\n\n    indented\n\n> ```\n> fenced\n> ```\n";
        let ranges = code_ranges(input, &ParseOptions::default()).unwrap();
        let found: Vec<&str> = ranges.iter().map(|range| &input[range.clone()]).collect();
        assert_eq!(found.len(), 4);
        assert_eq!(found[0], "`a\nb`");
        assert_eq!(found[1], "$x$");
        assert!(found[2].ends_with("indented"));
        assert_eq!(found[3], "```\n> fenced\n> ```");
    }

    #[test]
    fn math_is_enabled_by_default() {
        let root = parse_mdast("$x^2$", &ParseOptions::default()).unwrap();
        let paragraph = match &root {
            Node::Root(root) => &root.children[0],
            other => panic!("unexpected {other:?}"),
        };
        assert!(matches!(
            paragraph.children().map(|c| &c[0]),
            Some(Node::InlineMath(_))
        ));
    }
}
