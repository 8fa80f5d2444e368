#![deny(missing_docs)]
//! quire core: the document tree, markdown parsing pipeline, frontmatter, slugs
//! and HTML output.

/// MDAST to document tree conversion.
pub mod convert;
/// Core error and diagnostic types.
pub mod error;
/// YAML frontmatter extraction helpers.
pub mod frontmatter;
/// Document tree types.
pub mod hast;
/// HTML serialization.
pub mod html;
/// Markdown parsing utilities and extension hooks.
pub mod parse;
/// Slug generation utilities.
pub mod slug;

pub use convert::mdast_to_tree;
pub use error::{Diagnostics, QuireError, SourceLocation, Warning};
pub use frontmatter::{Frontmatter, FrontmatterError, FrontmatterExtraction, extract_frontmatter};
pub use hast::{BLOCK_TAGS, Comment, Element, Node, Properties, Root, Text, is_block};
pub use html::{element_to_html, is_void, to_html};
pub use parse::{
    ParseOptions, ParserPipeline, TextTransform, TreeTransform, code_ranges, parse_mdast,
    parse_mdast_with_options,
};
pub use slug::{Slugger, extract_custom_id, slugify};
