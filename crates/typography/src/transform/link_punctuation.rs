//! Moves punctuation that trails a Markdown link into the link text.
//!
//! `[text](url).` becomes `[text.](url)`, also through up to four emphasis
//! closers: `*[text](url)*,` becomes `*[text,](url)*`. Code and math are never
//! edited.

use crate::marked::{MarkedText, apply_marked};
use quire_core::{ParseOptions, TextTransform, code_ranges};
use std::borrow::Cow;
use std::ops::Range;

/// Punctuation and quotes that may be pulled into the link.
const TRAILING: &str = ".,!?;:\"'”’";
/// At most this many emphasis closers between the link and the punctuation.
const MAX_WRAPPERS: usize = 4;

/// Applies the rule to one stretch of Markdown. Backtick code spans are
/// skipped.
///
/// ```
/// use quire_typography::transform::link_punctuation::link_punctuation;
///
/// assert_eq!(link_punctuation("see [the post](/post)."), "see [the post.](/post)");
/// ```
pub fn link_punctuation(text: &str) -> String {
    apply_marked(text, link_punctuation_marked)
}

/// `link_punctuation` over merged text.
pub fn link_punctuation_marked(text: &MarkedText) -> MarkedText {
    let protected = code_spans(text.chars());
    move_punctuation(text, &protected)
}

/// Applies the rule to a whole Markdown document.
///
/// Code blocks (fenced or indented, at any nesting depth), code spans and
/// math are located with markdown-rs first and left alone.
pub fn link_punctuation_markdown<'a>(input: &'a str, options: &ParseOptions) -> Cow<'a, str> {
    if !input.contains("](") {
        return Cow::Borrowed(input);
    }
    let ranges = match code_ranges(input, options) {
        Ok(ranges) => ranges,
        Err(err) => {
            log::debug!("link punctuation skipped: {err}");
            return Cow::Borrowed(input);
        }
    };

    let text = MarkedText::parse(input);
    let protected = protected_chars(input, &ranges);
    let out = move_punctuation(&text, &protected).render();
    if out == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(out)
    }
}

/// Source transform for the parser pipeline.
#[derive(Debug, Clone, Copy)]
pub struct LinkPunctuation {
    options: ParseOptions,
}

impl LinkPunctuation {
    /// Locates code with the same options the document is parsed with.
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }
}

impl TextTransform for LinkPunctuation {
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        link_punctuation_markdown(input, &self.options)
    }
}

/// One flag per visible character of `input`: inside one of `ranges`.
fn protected_chars(input: &str, ranges: &[Range<usize>]) -> Vec<bool> {
    let mut ranges = ranges.iter().peekable();
    input
        .char_indices()
        .filter(|(_, c)| *c != crate::marked::SENTINEL)
        .map(|(offset, _)| {
            while ranges.next_if(|range| range.end <= offset).is_some() {}
            ranges.peek().is_some_and(|range| range.start <= offset)
        })
        .collect()
}

/// Flags the characters of backtick code spans.
fn code_spans(chars: &[char]) -> Vec<bool> {
    let mut protected = vec![false; chars.len()];
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '`' {
            let end = code_span_end(chars, i);
            protected[i..end].fill(true);
            i = end;
        } else {
            i += 1;
        }
    }
    protected
}

fn move_punctuation(text: &MarkedText, protected: &[bool]) -> MarkedText {
    let chars = text.chars();
    let mut out = MarkedText::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let Some(link) = match_link(chars, protected, i) else {
            out.copy_from(text, i);
            i += 1;
            continue;
        };

        // `[text`
        for j in i..link.close_bracket {
            out.copy_from(text, j);
        }
        // punctuation, carrying the boundaries that sat before `]`
        out.push_boundaries(text.marks_before(link.close_bracket));
        for j in link.punctuation.clone() {
            out.copy_from(text, j);
        }
        // `](url)` and the wrappers
        out.push(']');
        for j in link.close_bracket + 1..link.wrappers.end {
            out.copy_from(text, j);
        }
        i = link.punctuation.end;
    }

    out.push_boundaries(text.trailing_marks());
    out
}

struct LinkMatch {
    close_bracket: usize,
    wrappers: std::ops::Range<usize>,
    punctuation: std::ops::Range<usize>,
}

fn match_link(chars: &[char], protected: &[bool], open: usize) -> Option<LinkMatch> {
    if chars[open] != '['
        || protected[open]
        || open.checked_sub(1).is_some_and(|i| matches!(chars[i], '!' | '\\'))
    {
        return None;
    }

    let close_bracket = matching(chars, protected, open, '[', ']')?;
    if close_bracket == open + 1 || chars.get(close_bracket + 1) != Some(&'(') {
        return None;
    }
    let close_paren = matching(chars, protected, close_bracket + 1, '(', ')')?;

    let wrappers_start = close_paren + 1;
    let mut wrappers_end = wrappers_start;
    for _ in 0..MAX_WRAPPERS {
        match chars.get(wrappers_end) {
            Some(&c) if (c == '*' || c == '_') && !protected[wrappers_end] => {
                wrappers_end += if chars.get(wrappers_end + 1) == Some(&c) { 2 } else { 1 };
            }
            _ => break,
        }
    }

    let punctuation_end = wrappers_end
        + chars[wrappers_end..]
            .iter()
            .zip(&protected[wrappers_end..])
            .take_while(|(c, code)| !**code && TRAILING.contains(**c))
            .count();
    if punctuation_end == wrappers_end
        || chars
            .get(punctuation_end)
            .is_some_and(|c| c.is_alphanumeric() || *c == '_')
    {
        return None;
    }

    Some(LinkMatch {
        close_bracket,
        wrappers: wrappers_start..wrappers_end,
        punctuation: wrappers_end..punctuation_end,
    })
}

/// Index of the bracket closing the one at `open`, on the same line and
/// outside code.
fn matching(
    chars: &[char],
    protected: &[bool],
    open: usize,
    left: char,
    right: char,
) -> Option<usize> {
    if protected[open] {
        return None;
    }
    let mut depth = 0usize;
    let mut i = open;
    while let Some(&c) = chars.get(i) {
        if protected[i] {
            i += 1;
            continue;
        }
        match c {
            '\n' => return None,
            '\\' => i += 1,
            c if c == left => depth += 1,
            c if c == right => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// End of the inline code span opening at `start`, or just past the backtick
/// run if it never closes.
fn code_span_end(chars: &[char], start: usize) -> usize {
    let run = chars[start..].iter().take_while(|c| **c == '`').count();
    let mut i = start + run;
    while i < chars.len() {
        if chars[i] == '`' {
            let closing = chars[i..].iter().take_while(|c| **c == '`').count();
            if closing == run {
                return i + closing;
            }
            i += closing;
        } else {
            i += 1;
        }
    }
    start + run
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_punctuation_moves_inside() {
        assert_eq!(link_punctuation("[a](b)."), "[a.](b)");
        assert_eq!(link_punctuation("[a](b)?!"), "[a?!](b)");
        assert_eq!(link_punctuation("so [a](b), then"), "so [a,](b) then");
        assert_eq!(link_punctuation("“[a](b)”"), "“[a”](b)");
    }

    #[test]
    fn through_emphasis_closers() {
        assert_eq!(link_punctuation("*[a](b)*."), "*[a.](b)*");
        assert_eq!(link_punctuation("**_[a](b)_**;"), "**_[a;](b)_**");
    }

    #[test]
    fn nested_brackets_and_parens() {
        assert_eq!(
            link_punctuation("[a [b] c](https://x.org/wiki/A_(b))."),
            "[a [b] c.](https://x.org/wiki/A_(b))"
        );
    }

    #[test]
    fn leaves_other_text_alone() {
        assert_eq!(link_punctuation("![img](b)."), "![img](b).");
        assert_eq!(link_punctuation("[a](b).md"), "[a](b).md");
        assert_eq!(link_punctuation("[](b)."), "[](b).");
        assert_eq!(link_punctuation("[a] (b)."), "[a] (b).");
        assert_eq!(link_punctuation("\\[a](b)."), "\\[a](b).");
        assert_eq!(link_punctuation("`[a](b).`"), "`[a](b).`");
        assert_eq!(link_punctuation("[a](b) done"), "[a](b) done");
    }

    fn markdown(input: &str) -> Cow<'_, str> {
        link_punctuation_markdown(input, &ParseOptions::blog())
    }

    #[test]
    fn fenced_code_is_skipped() {
        let input = "[a](b).\n```md\n[a](b).\n```\n[c](d)!\n";
        assert_eq!(markdown(input), "[a.](b)\n```md\n[a](b).\n```\n[c!](d)\n");
        assert!(matches!(markdown("no links here."), Cow::Borrowed(_)));
    }

    #[test]
    fn code_anywhere_in_the_document_is_skipped() {
        let indented = "Para\n\n    see [a](b).\n";
        assert_eq!(markdown(indented), indented);

        let quoted_fence = "> ```\n> [a](b).\n> ```\n";
        assert_eq!(markdown(quoted_fence), quoted_fence);

        let listed_fence = "- item\n\n  ```\n  [a](b).\n  ```\n";
        assert_eq!(markdown(listed_fence), listed_fence);

        let multi_line_span = "``\n[a](b).\n``\n";
        assert_eq!(markdown(multi_line_span), multi_line_span);

        let math = "$[a](b).$ and [c](d).\n";
        assert_eq!(markdown(math), "$[a](b).$ and [c.](d)\n");
    }

    #[test]
    fn code_inside_link_text_is_kept() {
        assert_eq!(markdown("see [`x`](b).\n"), "see [`x`.](b)\n");
        assert_eq!(link_punctuation("see [`x]`](b)."), "see [`x]`.](b)");
    }

    #[test]
    fn boundaries_before_the_bracket_travel_with_the_punctuation() {
        let s = crate::marked::SENTINEL;
        let out = link_punctuation(&format!("[a{s}](b){s}.{s}"));
        assert_eq!(out, format!("[a{s}{s}.](b){s}"));
    }
}
