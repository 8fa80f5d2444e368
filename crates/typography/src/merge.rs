//! Merging block text across inline nodes and splitting it back.
//!
//! Each block element is handled as a unit: its text leaves (stopping at
//! nested blocks and opaque elements) are joined with a `SENTINEL` after every
//! leaf, a rule rewrites the joined string, and the result is cut at the
//! sentinels and written back leaf by leaf. Inline elements whose text is not
//! merged leave an `OBJECT` in the joined string.

use crate::marked::{
    MarkedText, OBJECT, SENTINEL, count_objects, count_sentinels, strip_objects, strip_sentinels,
};
use crate::transform::Rule;
use crate::transform::quotes::assert_smart_quotes_match;
use quire_core::{Diagnostics, Element, Node, QuireError, Root, is_block, is_void};

/// Tags whose text is never rewritten.
pub const OPAQUE_TAGS: &[&str] = &["code", "pre", "script", "style", "kbd", "samp", "svg"];

/// Classes marking rendered math.
const MATH_CLASSES: &[&str] = &["katex", "math", "math-inline", "math-display"];

/// Whether text under `element` is left untouched by every text pass.
pub fn is_opaque(element: &Element) -> bool {
    if OPAQUE_TAGS.contains(&element.tag_name.as_str()) {
        return true;
    }
    if MATH_CLASSES.iter().any(|class| element.has_class(class)) && !element.has_class("plain-text")
    {
        return true;
    }
    element.has_attr("data-footnote-ref")
        || element.has_attr("data-footnote-backref")
        || element.has_class("footnote-ref")
        || element.has_class("no-formatting")
}

/// One piece of a block's inline content.
#[derive(Debug)]
pub enum Leaf<'a> {
    /// A text node's value.
    Text(&'a mut String),
    /// An element that is not entered: nested block, opaque, void or skipped.
    Object,
}

/// Collects the leaves of one block, in document order.
///
/// Nested blocks are not entered, and neither are opaque elements, void
/// elements or elements for which `skip` returns true. Each of those becomes a
/// `Leaf::Object`.
pub fn collect_leaves<'a>(
    nodes: &'a mut [Node],
    skip: &dyn Fn(&Element) -> bool,
    leaves: &mut Vec<Leaf<'a>>,
) {
    for node in nodes {
        match node {
            Node::Text(text) => leaves.push(Leaf::Text(&mut text.value)),
            Node::Element(element) => {
                if is_block(element) || is_opaque(element) || is_void(element) || skip(element) {
                    leaves.push(Leaf::Object);
                } else {
                    collect_leaves(&mut element.children, skip, leaves);
                }
            }
            Node::Comment(_) | Node::Doctype => {}
        }
    }
}

/// Joins leaves: each text value followed by one `SENTINEL`, each object as
/// one `OBJECT`.
pub fn merge(leaves: &[Leaf<'_>]) -> String {
    let mut merged = String::new();
    for leaf in leaves {
        match leaf {
            Leaf::Text(value) => {
                merged.push_str(value);
                merged.push(SENTINEL);
            }
            Leaf::Object => merged.push(OBJECT),
        }
    }
    merged
}

/// Cuts merged text at the sentinels, dropping the empty segment after the
/// final one.
pub fn split(merged: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = merged.split(SENTINEL).collect();
    if segments.last() == Some(&"") {
        segments.pop();
    }
    segments
}

/// Runs one rule over the text of a single block.
///
/// `children` are the block's children. Leaves are only written when every
/// check passes.
pub fn apply_rule(
    children: &mut [Node],
    rule: Rule,
    check_invariance: bool,
    diagnostics: &mut Diagnostics,
) -> Result<(), QuireError> {
    let mut leaves = Vec::new();
    collect_leaves(children, &|element| rule.skips(element), &mut leaves);
    let merged = merge(&leaves);
    let texts: Vec<&mut String> = leaves
        .into_iter()
        .filter_map(|leaf| match leaf {
            Leaf::Text(value) => Some(value),
            Leaf::Object => None,
        })
        .collect();
    if texts.is_empty() {
        return Ok(());
    }

    let rewritten = rule.apply(&MarkedText::parse(&merged)).render();

    let found = count_sentinels(&rewritten);
    if found != texts.len() {
        return Err(QuireError::BoundaryMismatch {
            rule: rule.name().to_string(),
            expected: texts.len(),
            found,
        });
    }
    let objects = count_objects(&merged);
    let kept = count_objects(&rewritten);
    if kept != objects {
        return Err(QuireError::InlineObjectMismatch {
            rule: rule.name().to_string(),
            expected: objects,
            found: kept,
        });
    }

    let visible = strip_sentinels(&rewritten);
    if check_invariance {
        let plain = rule.apply_str(&strip_sentinels(&merged));
        if plain != visible {
            return Err(QuireError::InvarianceViolation {
                rule: rule.name().to_string(),
                marked: strip_objects(&visible),
                plain: strip_objects(&plain),
            });
        }
    }
    if rule == Rule::SmartQuotes
        && let Err(warning) = assert_smart_quotes_match(&visible)
    {
        diagnostics.warn(warning);
    }

    let unmarked = strip_objects(&rewritten);
    let segments = split(&unmarked);
    if segments.len() != texts.len() {
        return Err(QuireError::BoundaryMismatch {
            rule: rule.name().to_string(),
            expected: texts.len(),
            found: segments.len(),
        });
    }

    let mut changed = 0;
    for (leaf, segment) in texts.into_iter().zip(segments) {
        if leaf.as_str() != segment {
            *leaf = segment.to_string();
            changed += 1;
        }
    }
    if changed > 0 {
        log::debug!("{rule}: rewrote {changed} text node(s)");
    }
    Ok(())
}

/// Runs `rules` over every block of the document, in order, block by block.
pub fn transform_tree(
    root: &mut Root,
    rules: &[Rule],
    check_invariance: bool,
    diagnostics: &mut Diagnostics,
) -> Result<(), QuireError> {
    transform_block(&mut root.children, rules, check_invariance, diagnostics)
}

/// Rewrites one block (given by its children), then the blocks nested in it.
pub fn transform_block(
    children: &mut [Node],
    rules: &[Rule],
    check_invariance: bool,
    diagnostics: &mut Diagnostics,
) -> Result<(), QuireError> {
    for &rule in rules {
        apply_rule(children, rule, check_invariance, diagnostics)?;
    }
    transform_nested_blocks(children, rules, check_invariance, diagnostics)
}

fn transform_nested_blocks(
    children: &mut [Node],
    rules: &[Rule],
    check_invariance: bool,
    diagnostics: &mut Diagnostics,
) -> Result<(), QuireError> {
    for node in children {
        let Node::Element(element) = node else {
            continue;
        };
        if is_opaque(element) {
            continue;
        }
        if is_block(element) {
            transform_block(&mut element.children, rules, check_invariance, diagnostics)?;
        } else {
            transform_nested_blocks(&mut element.children, rules, check_invariance, diagnostics)?;
        }
    }
    Ok(())
}
