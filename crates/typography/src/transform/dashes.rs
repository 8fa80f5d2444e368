//! Em and en dashes.

use crate::marked::{Edit, MarkedText, apply_marked};

/// `—`
pub const EM_DASH: char = '\u{2014}';
/// `–`
pub const EN_DASH: char = '\u{2013}';

/// Characters that make up a dash run.
const DASH_RUN: [char; 4] = ['-', '~', EN_DASH, EM_DASH];
/// No space is put between these and a following em dash.
const OPENERS: &str = "([{“‘\"'";
/// No space is put between an em dash and these.
const CLOSERS: &str = ")]}”’,.;:!?";

/// Em dashes, then number ranges.
pub fn normalize_dashes(text: &str) -> String {
    apply_marked(text, |marked| en_dash_ranges_marked(&em_dashes_marked(marked)))
}

/// Turns dash runs into em dashes and normalizes the spaces around them.
///
/// ```
/// use quire_typography::transform::dashes::em_dashes;
///
/// assert_eq!(em_dashes("wait - really?"), "wait — really?");
/// assert_eq!(em_dashes("this--that"), "this — that");
/// ```
pub fn em_dashes(text: &str) -> String {
    apply_marked(text, em_dashes_marked)
}

/// `em_dashes` over merged text.
pub fn em_dashes_marked(text: &MarkedText) -> MarkedText {
    space_em_dashes(&collapse_dash_runs(text))
}

/// Turns `-` between two numbers into an en dash.
///
/// ```
/// use quire_typography::transform::dashes::en_dash_ranges;
///
/// assert_eq!(en_dash_ranges("pages 206-207"), "pages 206–207");
/// assert_eq!(en_dash_ranges("2024-01-15"), "2024-01-15");
/// ```
pub fn en_dash_ranges(text: &str) -> String {
    apply_marked(text, en_dash_ranges_marked)
}

/// `en_dash_ranges` over merged text.
pub fn en_dash_ranges_marked(text: &MarkedText) -> MarkedText {
    text.map_chars(|text, i| {
        let c = text.chars()[i];
        if c == '-' && is_number_range(text.chars(), i) {
            EN_DASH
        } else {
            c
        }
    })
}

fn collapse_dash_runs(text: &MarkedText) -> MarkedText {
    let chars = text.chars();
    let mut out = MarkedText::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if !DASH_RUN.contains(&chars[i]) {
            out.copy_from(text, i);
            i += 1;
            continue;
        }

        let end = run_end(chars, i, |c| DASH_RUN.contains(&c));
        if becomes_em_dash(text, i, end) {
            out.push_boundaries(text.marks_before(i));
            out.push(EM_DASH);
            for j in i + 1..end {
                out.push_boundaries(text.marks_before(j));
            }
        } else {
            for j in i..end {
                out.copy_from(text, j);
            }
        }
        i = end;
    }
    out.push_boundaries(text.trailing_marks());
    out
}

fn becomes_em_dash(text: &MarkedText, start: usize, end: usize) -> bool {
    let run = &text.chars()[start..end];
    if run.iter().all(|c| *c == EM_DASH) {
        return false;
    }
    let prev = text.before(start);
    let next = text.get(end);

    let spaced = prev.is_none_or(char::is_whitespace) && next.is_none_or(char::is_whitespace);
    let doubled = run.len() >= 2
        && prev.is_some_and(char::is_alphanumeric)
        && next.is_none_or(|n| n.is_alphanumeric() || n.is_whitespace());
    spaced || doubled
}

/// One space on each side of an em dash, except at line edges, after openers
/// and before closers.
fn space_em_dashes(text: &MarkedText) -> MarkedText {
    let chars = text.chars();
    let mut edits = vec![Edit::Keep; chars.len()];

    let mut start = 0;
    while start < chars.len() {
        if chars[start] != EM_DASH {
            start += 1;
            continue;
        }
        let end = run_end(chars, start, |c| c == EM_DASH);
        let before = start - chars[..start].iter().rev().take_while(|c| is_space(**c)).count();
        let after = end + chars[end..].iter().take_while(|c| is_space(**c)).count();
        let space_before = wants_space_before(chars, before);
        let space_after = chars
            .get(after)
            .is_some_and(|n| *n != '\n' && !CLOSERS.contains(*n));

        for edit in &mut edits[before..start] {
            *edit = Edit::Delete;
        }
        for edit in &mut edits[end..after] {
            *edit = Edit::Delete;
        }
        if space_before && before < start {
            edits[before] = Edit::Keep;
        }
        if space_after && end < after {
            edits[end] = Edit::Keep;
        }

        let lead = if space_before && before == start { " " } else { "" };
        let trail = if space_after && end == after { " " } else { "" };
        if start + 1 == end {
            edits[start] = Edit::Replace(format!("{lead}{EM_DASH}{trail}"));
        } else {
            edits[start] = Edit::Replace(format!("{lead}{EM_DASH}"));
            edits[end - 1] = Edit::Replace(format!("{EM_DASH}{trail}"));
        }
        start = end;
    }

    text.rewrite(|_, i| std::mem::replace(&mut edits[i], Edit::Keep))
}

fn wants_space_before(chars: &[char], before: usize) -> bool {
    let prev = before.checked_sub(1).map(|i| chars[i]);
    match prev {
        None | Some('\n') => false,
        Some('"' | '”') if before >= 2 && matches!(chars[before - 2], '.' | '!' | '?') => true,
        Some(p) => !OPENERS.contains(p),
    }
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn run_end(chars: &[char], start: usize, member: impl Fn(char) -> bool) -> usize {
    start + chars[start..].iter().take_while(|c| member(**c)).count()
}

/// A hyphen joining two digit runs that are not part of a date, version,
/// decimal or hyphenated word.
fn is_number_range(chars: &[char], hyphen: usize) -> bool {
    let left = chars[..hyphen]
        .iter()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();
    let right = chars[hyphen + 1..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if left == 0 || right == 0 {
        return false;
    }

    let first = hyphen - left;
    let before_ok = match first.checked_sub(1).map(|i| chars[i]) {
        None => true,
        // p.206-207
        Some('.') => first >= 2 && chars[first - 2] == 'p',
        Some(c) => !(c.is_alphanumeric() || matches!(c, '_' | '-' | EN_DASH | EM_DASH)),
    };

    let last = hyphen + 1 + right;
    let after_ok = match chars.get(last).copied() {
        None => true,
        Some('.') => !chars.get(last + 1).is_some_and(char::is_ascii_digit),
        Some(c) => !(c.is_alphanumeric() || matches!(c, '_' | '-' | EN_DASH)),
    };

    before_ok && after_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaced_hyphen_becomes_em_dash() {
        assert_eq!(em_dashes("wait - really?"), "wait — really?");
        assert_eq!(em_dashes("wait   --   really?"), "wait — really?");
        assert_eq!(em_dashes("wait ~ really?"), "wait — really?");
        assert_eq!(em_dashes("wait – really?"), "wait — really?");
    }

    #[test]
    fn doubled_hyphens_between_words() {
        assert_eq!(em_dashes("this--that"), "this — that");
        assert_eq!(em_dashes("this---that"), "this — that");
        assert_eq!(em_dashes("well-known"), "well-known");
        assert_eq!(em_dashes("run --release"), "run --release");
    }

    #[test]
    fn leading_line_hyphen() {
        assert_eq!(em_dashes("- Alan Kay"), "— Alan Kay");
        assert_eq!(em_dashes("Quote.\n- Alan Kay"), "Quote.\n— Alan Kay");
    }

    #[test]
    fn existing_em_dashes_get_canonical_spacing() {
        assert_eq!(em_dashes("this—that"), "this — that");
        assert_eq!(em_dashes("this  —that"), "this — that");
        assert_eq!(em_dashes("(—aside)"), "(— aside)");
        assert_eq!(em_dashes("an aside—)"), "an aside —)");
        assert_eq!(em_dashes("trailing —"), "trailing —");
        assert_eq!(em_dashes("trailing — "), "trailing —");
    }

    #[test]
    fn space_after_quoted_sentence_end() {
        assert_eq!(em_dashes("“Stop.”—and he did"), "“Stop.” — and he did");
        assert_eq!(em_dashes("\"—quoted"), "\"— quoted");
    }

    #[test]
    fn number_ranges() {
        assert_eq!(en_dash_ranges("pages 206-207"), "pages 206–207");
        assert_eq!(en_dash_ranges("(1990-1995)"), "(1990–1995)");
        assert_eq!(en_dash_ranges("p.12-14"), "p.12–14");
        assert_eq!(en_dash_ranges("p. 12-14"), "p. 12–14");
    }

    #[test]
    fn number_like_tokens_keep_hyphens() {
        assert_eq!(en_dash_ranges("2024-01-15"), "2024-01-15");
        assert_eq!(en_dash_ranges("978-3-16-148410-0"), "978-3-16-148410-0");
        assert_eq!(en_dash_ranges("v1.2-3"), "v1.2-3");
        assert_eq!(en_dash_ranges("1-2.5"), "1-2.5");
        assert_eq!(en_dash_ranges("GPT-4-32k"), "GPT-4-32k");
        assert_eq!(en_dash_ranges("x-1"), "x-1");
    }

    #[test]
    fn range_at_sentence_end() {
        assert_eq!(en_dash_ranges("See 3-5."), "See 3–5.");
    }

    #[test]
    fn normalize_runs_both_passes() {
        assert_eq!(
            normalize_dashes("pages 206-207 - or so"),
            "pages 206–207 — or so"
        );
    }

    #[test]
    fn boundaries_inside_a_run_move_after_the_dash() {
        let s = crate::marked::SENTINEL;
        let out = em_dashes(&format!("a -{s}- b{s}"));
        assert_eq!(out, format!("a —{s} b{s}"));
    }
}
