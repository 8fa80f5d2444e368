//! Heading slugs compatible with github-slugger.

use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Splits a trailing `{#custom-id}` off heading text.
///
/// The id may only contain ASCII alphanumerics, `-` and `_`. Returns the text
/// without the suffix and the id, or the original text and `None`.
///
/// # Examples
///
/// ```
/// use quire_core::slug::extract_custom_id;
///
/// assert_eq!(extract_custom_id("Setup {#setup}"), ("Setup", Some("setup")));
/// assert_eq!(extract_custom_id("Setup"), ("Setup", None));
/// ```
pub fn extract_custom_id(text: &str) -> (&str, Option<&str>) {
    let trimmed = text.trim_end();
    let Some(body) = trimmed.strip_suffix('}') else {
        return (text, None);
    };
    let Some(open) = body.rfind("{#") else {
        return (text, None);
    };

    let id = &body[open + 2..];
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if !valid {
        return (text, None);
    }
    (body[..open].trim_end(), Some(id))
}

/// Hands out unique slugs for the headings of one document.
#[derive(Debug, Default)]
pub struct Slugger {
    counts: HashMap<String, usize>,
}

impl Slugger {
    /// Empty slugger for a new document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug for `text`, suffixed if already taken in this document.
    pub fn next_slug(&mut self, text: &str) -> String {
        slugify(text, &mut self.counts)
    }

    /// Marks `slug` as taken, e.g. by a custom heading id.
    pub fn reserve(&mut self, slug: &str) {
        *self.counts.entry(slug.to_string()).or_insert(0) += 1;
    }
}

/// Combining marks (Mn/Mc/Me) kept in slugs so Indic, Arabic, Hebrew and Thai
/// headings survive intact.
const COMBINING_MARKS: &[RangeInclusive<u32>] = &[
    0x0300..=0x036F,
    0x0591..=0x05BD,
    0x05BF..=0x05C7,
    0x0610..=0x061A,
    0x064B..=0x065F,
    0x0670..=0x0670,
    0x0900..=0x0903,
    0x093A..=0x094F,
    0x0951..=0x0957,
    0x0962..=0x0963,
    0x0980..=0x0983,
    0x09BC..=0x09CD,
    0x0A01..=0x0A03,
    0x0A3C..=0x0A4D,
    0x0A81..=0x0A83,
    0x0ABC..=0x0ACD,
    0x0B01..=0x0B03,
    0x0BBE..=0x0BCD,
    0x0E31..=0x0E3A,
    0x0E47..=0x0E4E,
    0x1AB0..=0x1AFF,
    0x1DC0..=0x1DFF,
    0x302A..=0x302F,
    0x3099..=0x309A,
    0xFE20..=0xFE2F,
];

fn is_combining_mark(ch: char) -> bool {
    let cp = ch as u32;
    COMBINING_MARKS.iter().any(|r| r.contains(&cp))
}

/// Turns heading text into an id, counting uses in `counts`.
///
/// Lowercases, keeps alphanumerics, `-`, `_` and combining marks, turns each
/// space into `-` and drops everything else. Repeated slugs get `-1`, `-2`, ...
pub fn slugify(text: &str, counts: &mut HashMap<String, usize>) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            slug.push(ch.to_ascii_lowercase());
        } else if ch == ' ' {
            slug.push('-');
        } else if !ch.is_ascii() && (ch.is_alphanumeric() || is_combining_mark(ch)) {
            slug.extend(ch.to_lowercase());
        }
    }

    if slug.is_empty() {
        slug.push_str("heading");
    }

    let seen = counts.entry(slug.clone()).or_insert(0);
    if *seen > 0 {
        slug = format!("{}-{}", slug, seen);
    }
    *seen += 1;
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(text: &str) -> String {
        slugify(text, &mut HashMap::new())
    }

    #[test]
    fn punctuation_dropped_spaces_hyphenated() {
        assert_eq!(slug("Hello World"), "hello-world");
        assert_eq!(slug("Why AI?"), "why-ai");
        assert_eq!(slug("Shard theory & values"), "shard-theory--values");
        assert_eq!(slug("  a---b  "), "--a---b--");
    }

    #[test]
    fn smart_punctuation_is_dropped() {
        assert_eq!(slug("“Reward” is not — the goal"), "reward-is-not--the-goal");
        assert_eq!(slug("Pages 206–207"), "pages-206207");
    }

    #[test]
    fn repeated_headings_are_numbered() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.next_slug("Appendix"), "appendix");
        assert_eq!(slugger.next_slug("Appendix"), "appendix-1");
        assert_eq!(slugger.next_slug("Appendix"), "appendix-2");
    }

    #[test]
    fn reserve_prevents_collision() {
        let mut slugger = Slugger::new();
        slugger.reserve("intro");
        assert_eq!(slugger.next_slug("Intro"), "intro-1");
    }

    #[test]
    fn unicode_and_combining_marks_preserved() {
        assert_eq!(slug("Héllo Wörld"), "héllo-wörld");
        assert_eq!(slug("多言語 ガイド"), "多言語-ガイド");
        assert_eq!(slug("डिफ़ॉल्ट रूप"), "डिफ़ॉल्ट-रूप");
        assert_eq!(slug("🚀 Launch"), "-launch");
    }

    #[test]
    fn empty_slug_falls_back() {
        assert_eq!(slug("???"), "heading");
    }

    #[test]
    fn custom_ids() {
        assert_eq!(
            extract_custom_id("My Heading {#my-heading}  "),
            ("My Heading", Some("my-heading"))
        );
        assert_eq!(
            extract_custom_id("Title {#bad id}"),
            ("Title {#bad id}", None)
        );
        assert_eq!(extract_custom_id("Title {#}"), ("Title {#}", None));
    }
}
