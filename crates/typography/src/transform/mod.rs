//! Text rewrite rules.
//!
//! - `quotes`: straight to curly quotes, period/comma placement.
//! - `dashes`: em dashes with canonical spacing, en-dash number ranges.
//! - `slashes`: spaced slashes between words to full-width slashes.
//! - `link_punctuation`: trailing punctuation pulled into Markdown links.
//!
//! Every rule is written against `MarkedText`, so it can run on text merged
//! from several nodes without disturbing their boundaries.

/// Em and en dashes.
pub mod dashes;
/// Markdown link punctuation.
pub mod link_punctuation;
/// Smart quotes.
pub mod quotes;
/// Full-width slashes.
pub mod slashes;

use crate::marked::MarkedText;
use quire_core::Element;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rewrite rule applied to merged block text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// `quotes::smart_quotes`
    SmartQuotes,
    /// `dashes::em_dashes`
    EmDashes,
    /// `dashes::en_dash_ranges`
    EnDashRanges,
    /// `slashes::full_width_slashes`
    FullWidthSlashes,
    /// `link_punctuation::link_punctuation`
    LinkPunctuation,
}

impl Rule {
    /// Every rule, in application order.
    pub const ALL: [Rule; 5] = [
        Rule::LinkPunctuation,
        Rule::SmartQuotes,
        Rule::EmDashes,
        Rule::EnDashRanges,
        Rule::FullWidthSlashes,
    ];

    /// Stable rule name used in errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            Rule::SmartQuotes => "smart-quotes",
            Rule::EmDashes => "em-dashes",
            Rule::EnDashRanges => "en-dash-ranges",
            Rule::FullWidthSlashes => "full-width-slashes",
            Rule::LinkPunctuation => "link-punctuation",
        }
    }

    /// Rewrites merged text.
    pub fn apply(self, text: &MarkedText) -> MarkedText {
        match self {
            Rule::SmartQuotes => quotes::smart_quotes_marked(text),
            Rule::EmDashes => dashes::em_dashes_marked(text),
            Rule::EnDashRanges => dashes::en_dash_ranges_marked(text),
            Rule::FullWidthSlashes => slashes::full_width_slashes_marked(text),
            Rule::LinkPunctuation => link_punctuation::link_punctuation_marked(text),
        }
    }

    /// Rewrites a plain or sentinel-marked string.
    pub fn apply_str(self, text: &str) -> String {
        self.apply(&MarkedText::parse(text)).render()
    }

    /// Whether text under `element` is left out when this rule runs, on top
    /// of the elements that are always opaque.
    pub fn skips(self, element: &Element) -> bool {
        match self {
            Rule::FullWidthSlashes => element.tag_name == "a" || element.has_class("fraction"),
            _ => false,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
