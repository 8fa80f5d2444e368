#![deny(missing_docs)]
//! quire typography: text rewrites that see through inline markup, emphasis
//! conversion, small caps and the table of contents.

/// Literal emphasis markers to elements.
pub mod emphasis;
/// Heading ids and TOC entries.
pub mod headings;
/// Text with node boundaries.
pub mod marked;
/// Block text merge, rewrite and split.
pub mod merge;
/// Markdown to typeset document.
pub mod pipeline;
/// Acronym detection.
pub mod small_caps;
/// Table of contents builder.
pub mod toc;
/// Rewrite rules.
pub mod transform;

pub use emphasis::{EmphasisKind, convert_all_emphasis, convert_emphasis, split_emphasis};
pub use headings::collect_headings;
pub use marked::{Edit, MarkedText, SENTINEL, strip_sentinels};
pub use merge::{apply_rule, is_opaque, transform_tree};
pub use pipeline::{Document, Options, improve_formatting, typeset_document, typeset_inline};
pub use small_caps::small_caps;
pub use toc::{TocEntry, build_toc, toc_list};
pub use transform::Rule;
pub use transform::quotes::assert_smart_quotes_match;
