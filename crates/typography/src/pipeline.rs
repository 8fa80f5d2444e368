//! Document pipeline: Markdown in, typeset tree and metadata out.

use crate::emphasis::convert_all_emphasis;
use crate::headings::{apply_custom_ids, collect_headings};
use crate::merge::transform_tree;
use crate::toc::{TocEntry, build_toc};
use crate::transform::Rule;
use crate::transform::link_punctuation::LinkPunctuation;
use quire_core::{
    Diagnostics, Element, Frontmatter, FrontmatterExtraction, Node, ParseOptions, ParserPipeline,
    QuireError, Root, element_to_html, extract_frontmatter, to_html,
};

/// Typography options.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Options {
    /// Curly quotes.
    #[serde(default = "default_enabled")]
    pub smart_quotes: bool,
    /// Em dashes and en-dash number ranges.
    #[serde(default = "default_enabled")]
    pub dashes: bool,
    /// ` / ` between words to ` ／ `.
    #[serde(default = "default_enabled")]
    pub full_width_slashes: bool,
    /// Punctuation after a link moved into the link text.
    #[serde(default = "default_enabled")]
    pub link_punctuation: bool,
    /// Literal `**bold**` / `_italic_` left in text converted to elements.
    #[serde(default = "default_enabled")]
    pub emphasis: bool,
    /// Build a table of contents (a post can still opt out in frontmatter).
    #[serde(default = "default_enabled")]
    pub table_of_contents: bool,
    /// Wrap heading content in a link to the heading.
    #[serde(default)]
    pub heading_autolinks: bool,
    /// Fail a document when a rule behaves differently across node
    /// boundaries than on plain text.
    #[serde(default = "default_enabled")]
    pub check_invariance: bool,
    /// `$inline$` and `$$block$$` math.
    #[serde(default = "default_enabled")]
    pub math: bool,
    /// Tables, footnotes, strikethrough, task lists and autolinks.
    #[serde(default = "default_enabled")]
    pub gfm: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self {
            smart_quotes: default_enabled(),
            dashes: default_enabled(),
            full_width_slashes: default_enabled(),
            link_punctuation: default_enabled(),
            emphasis: default_enabled(),
            table_of_contents: default_enabled(),
            heading_autolinks: false,
            check_invariance: default_enabled(),
            math: default_enabled(),
            gfm: default_enabled(),
        }
    }
}

impl Options {
    /// Rules run on the tree, in order. Link punctuation is applied to the
    /// Markdown source instead.
    pub fn tree_rules(&self) -> Vec<Rule> {
        let mut rules = Vec::new();
        if self.smart_quotes {
            rules.push(Rule::SmartQuotes);
        }
        if self.dashes {
            rules.push(Rule::EmDashes);
            rules.push(Rule::EnDashRanges);
        }
        if self.full_width_slashes {
            rules.push(Rule::FullWidthSlashes);
        }
        rules
    }

    /// Markdown parser settings.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            gfm: self.gfm,
            math: self.math,
            ..ParseOptions::blog()
        }
    }

    /// Every text pass and the table of contents off.
    pub fn plain() -> Self {
        Self {
            smart_quotes: false,
            dashes: false,
            full_width_slashes: false,
            link_punctuation: false,
            emphasis: false,
            table_of_contents: false,
            ..Self::default()
        }
    }
}

/// Applies emphasis conversion and the tree rules to a parsed document.
pub fn improve_formatting(
    root: &mut Root,
    options: &Options,
    diagnostics: &mut Diagnostics,
) -> Result<(), QuireError> {
    if options.emphasis {
        convert_all_emphasis(root);
    }
    transform_tree(
        root,
        &options.tree_rules(),
        options.check_invariance,
        diagnostics,
    )
}

/// A typeset document.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Document {
    /// Parsed frontmatter.
    pub frontmatter: Frontmatter,
    /// Typeset title text, if the frontmatter has a title.
    pub title: Option<String>,
    /// Typeset title as inline HTML.
    pub title_html: Option<String>,
    /// Headings in document order.
    pub headings: Vec<TocEntry>,
    /// `nav.toc`, when enabled and there are headings.
    pub toc: Option<Element>,
    /// Document body.
    pub root: Root,
}

impl Document {
    /// Body HTML, preceded by the table of contents if there is one.
    pub fn to_html(&self) -> String {
        let body = to_html(&self.root);
        match &self.toc {
            Some(toc) => element_to_html(toc) + &body,
            None => body,
        }
    }
}

/// Parses and typesets one Markdown document.
///
/// Warnings (unbalanced quotes, unsupported syntax) go to `diagnostics`;
/// errors abort the document.
///
/// ```
/// use quire_core::Diagnostics;
/// use quire_typography::{Options, typeset_document};
///
/// let doc = typeset_document(
///     "Pages 206-207 - see [the notes](/notes).",
///     &Options::default(),
///     &mut Diagnostics::new(),
/// )
/// .unwrap();
/// assert_eq!(
///     doc.to_html(),
///     "<p>Pages 206–207 — see <a href=\"/notes\">the notes.</a></p>"
/// );
/// ```
pub fn typeset_document(
    input: &str,
    options: &Options,
    diagnostics: &mut Diagnostics,
) -> Result<Document, QuireError> {
    // 1. Frontmatter
    let FrontmatterExtraction {
        frontmatter,
        body_start,
    } = extract_frontmatter(input)?;
    let body = &input[body_start..];

    // 2. Options for this document
    let options = if frontmatter.no_formatting {
        log::debug!("typography disabled by frontmatter");
        Options {
            table_of_contents: options.table_of_contents,
            heading_autolinks: options.heading_autolinks,
            ..Options::plain()
        }
    } else {
        options.clone()
    };

    // 3. Parse, with link punctuation on the source and typography on the tree
    let mut pipeline = ParserPipeline::new(options.parse_options());
    if options.link_punctuation {
        pipeline.add_text_transform(LinkPunctuation::new(options.parse_options()));
    }
    pipeline.add_tree_transform(
        |root: &mut Root, _: &mut Diagnostics| -> Result<(), QuireError> {
            apply_custom_ids(root);
            Ok(())
        },
    );
    let formatting = options.clone();
    pipeline.add_tree_transform(move |root: &mut Root, diagnostics: &mut Diagnostics| {
        improve_formatting(root, &formatting, diagnostics)
    });
    let mut root = pipeline.parse(body, diagnostics)?;

    // 4. Headings and table of contents
    let headings = collect_headings(&mut root, options.heading_autolinks);
    let toc = if options.table_of_contents && frontmatter.toc {
        build_toc(&headings)
    } else {
        None
    };

    // 5. Title
    let title_nodes = frontmatter
        .title
        .as_deref()
        .map(|title| typeset_inline(title, &options, diagnostics))
        .transpose()?;
    let title = title_nodes
        .as_ref()
        .map(|nodes| Root::new(nodes.clone()).text_content());
    let title_html = title_nodes.map(|nodes| to_html(&Root::new(nodes)));

    Ok(Document {
        frontmatter,
        title,
        title_html,
        headings,
        toc,
        root,
    })
}

/// Typesets a short run of inline text such as a title.
pub fn typeset_inline(
    text: &str,
    options: &Options,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Node>, QuireError> {
    let mut root = Root::new(vec![Node::text(text)]);
    improve_formatting(&mut root, options, diagnostics)?;
    Ok(root.children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: &str) -> Document {
        typeset_document(input, &Options::default(), &mut Diagnostics::new()).unwrap()
    }

    #[test]
    fn options_default_from_empty_json() {
        let options: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(options, Options::default());

        let options: Options = serde_json::from_str(r#"{"smart_quotes": false}"#).unwrap();
        assert!(!options.smart_quotes);
        assert_eq!(
            options.tree_rules(),
            vec![Rule::EmDashes, Rule::EnDashRanges, Rule::FullWidthSlashes]
        );
    }

    #[test]
    fn title_is_typeset() {
        let doc = render("---\ntitle: \"The **real** \\\"answer\\\" - maybe\"\n---\nBody");
        assert_eq!(doc.title.as_deref(), Some("The real “answer” — maybe"));
        assert_eq!(
            doc.title_html.as_deref(),
            Some("The <strong>real</strong> “answer” — maybe")
        );
    }

    #[test]
    fn toc_follows_frontmatter() {
        let doc = render("# One\n\n## Two\n");
        assert!(doc.toc.is_some());
        assert_eq!(doc.headings.len(), 2);

        let doc = render("---\ntoc: false\n---\n# One\n");
        assert!(doc.toc.is_none());
        assert_eq!(doc.headings.len(), 1);
    }

    #[test]
    fn no_formatting_leaves_text_alone() {
        let doc = render("---\nno_formatting: true\n---\n\"a\" - [b](c).\n");
        assert_eq!(doc.to_html(), "<p>\"a\" - <a href=\"c\">b</a>.</p>");
    }

    #[test]
    fn unbalanced_quotes_are_warnings() {
        let mut diagnostics = Diagnostics::new();
        let doc = typeset_document(
            "He said \"yes and left.\n",
            &Options::default(),
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(doc.to_html(), "<p>He said “yes and left.</p>");
        assert_eq!(diagnostics.count(), 1);
    }
}
