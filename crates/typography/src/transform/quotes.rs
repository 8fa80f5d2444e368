//! Smart quotes.
//!
//! Straight quotes are resolved from their visible neighbours in four passes:
//! single quotes, double quotes, periods moved inside closing double quotes,
//! commas moved outside closing quotes.

use crate::marked::{MarkedText, apply_marked, strip_objects, strip_sentinels};
use quire_core::Warning;

/// `‘`
pub const LEFT_SINGLE: char = '\u{2018}';
/// `’`
pub const RIGHT_SINGLE: char = '\u{2019}';
/// `“`
pub const LEFT_DOUBLE: char = '\u{201C}';
/// `”`
pub const RIGHT_DOUBLE: char = '\u{201D}';

/// Characters after which a quote opens.
const OPENS_AFTER_SINGLE: &str = "\"“([{-—/";
const OPENS_AFTER_DOUBLE: &str = "([{/-—‘'";
/// Characters that cannot follow an opening double quote.
const NOT_AFTER_OPEN_DOUBLE: &str = ")]}—,!?;:/.";
/// Characters that may follow a closing double quote.
const AFTER_CLOSE_DOUBLE: &str = "/).,;—:-}]!?’'…";

/// Converts straight quotes to typographic quotes.
///
/// ```
/// use quire_typography::transform::quotes::smart_quotes;
///
/// assert_eq!(smart_quotes(r#"She said "it's fine""#), "She said “it’s fine”");
/// ```
pub fn smart_quotes(text: &str) -> String {
    apply_marked(text, smart_quotes_marked)
}

/// `smart_quotes` over merged text.
pub fn smart_quotes_marked(text: &MarkedText) -> MarkedText {
    let text = text.map_chars(single_quote);
    let text = text.map_chars(double_quote);
    let text = periods_inside(&text);
    commas_outside(&text)
}

fn single_quote(text: &MarkedText, i: usize) -> char {
    let c = text.chars()[i];
    if c != '\'' {
        return c;
    }
    let prev = text.before(i);
    let next = text.get(i + 1);

    // '90s
    if is_decade(text, i + 1) || is_elision(text, i + 1) {
        return RIGHT_SINGLE;
    }
    let opens = prev.is_none_or(|p| p.is_whitespace() || OPENS_AFTER_SINGLE.contains(p));
    if opens && next.is_some_and(|n| !n.is_whitespace()) {
        LEFT_SINGLE
    } else if prev.is_some_and(|p| !p.is_whitespace()) {
        RIGHT_SINGLE
    } else {
        c
    }
}

fn is_decade(text: &MarkedText, start: usize) -> bool {
    matches!(
        (text.get(start), text.get(start + 1), text.get(start + 2)),
        (Some(a), Some(b), Some('s')) if a.is_ascii_digit() && b.is_ascii_digit()
    )
}

/// Words that drop their leading letters, as in `'tis` and `'cause`.
const ELISIONS: &[&str] = &["cause", "em", "nother", "round", "til", "tis", "twas", "twere"];

fn is_elision(text: &MarkedText, start: usize) -> bool {
    let mut word = String::new();
    let mut end = start;
    while let Some(c) = text.get(end).filter(|c| c.is_alphabetic()) {
        word.extend(c.to_lowercase());
        end += 1;
    }
    text.get(end) != Some('\'') && ELISIONS.contains(&word.as_str())
}

fn double_quote(text: &MarkedText, i: usize) -> char {
    let c = text.chars()[i];
    if c != '"' {
        return c;
    }
    let prev = text.before(i);
    let next = text.get(i + 1);

    let opens = prev.is_none_or(|p| p.is_whitespace() || OPENS_AFTER_DOUBLE.contains(p))
        && next.is_some_and(|n| !n.is_whitespace() && !NOT_AFTER_OPEN_DOUBLE.contains(n));
    if opens {
        return LEFT_DOUBLE;
    }

    let closes = next.is_none()
        || (prev.is_some_and(|p| !p.is_whitespace() && p != '(')
            && next.is_some_and(|n| n.is_whitespace() || AFTER_CLOSE_DOUBLE.contains(n)));
    if closes { RIGHT_DOUBLE } else { c }
}

/// `”.` becomes `.”` unless the quote already ends in `.`, `!` or `?`, or the
/// period starts an ellipsis.
fn periods_inside(text: &MarkedText) -> MarkedText {
    let mut out = MarkedText::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let moves = text.get(i) == Some(RIGHT_DOUBLE)
            && text.get(i + 1) == Some('.')
            && !matches!(text.before(i), Some('.' | '!' | '?'))
            && !(text.get(i + 2) == Some('.') && text.get(i + 3) == Some('.'));
        if moves {
            out.push_boundaries(text.marks_before(i));
            out.push('.');
            out.push(RIGHT_DOUBLE);
            out.push_boundaries(text.marks_before(i + 1));
            i += 2;
        } else {
            out.copy_from(text, i);
            i += 1;
        }
    }
    out.push_boundaries(text.trailing_marks());
    out
}

/// `,”` becomes `”,` (and `,’` becomes `’,`) unless the comma follows `!`/`?`.
fn commas_outside(text: &MarkedText) -> MarkedText {
    let mut out = MarkedText::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let quote = text.get(i + 1).filter(|q| *q == RIGHT_DOUBLE || *q == RIGHT_SINGLE);
        match quote {
            Some(quote)
                if text.get(i) == Some(',') && !matches!(text.before(i), Some('!' | '?')) =>
            {
                out.push_boundaries(text.marks_before(i));
                out.push(quote);
                out.push_boundaries(text.marks_before(i + 1));
                out.push(',');
                i += 2;
            }
            _ => {
                out.copy_from(text, i);
                i += 1;
            }
        }
    }
    out.push_boundaries(text.trailing_marks());
    out
}

/// Checks that curly double quotes pair up.
///
/// Single quotes are not checked: `’` is also the apostrophe.
pub fn assert_smart_quotes_match(text: &str) -> Result<(), Warning> {
    let mut stack = Vec::new();
    for c in text.chars() {
        match c {
            LEFT_DOUBLE => stack.push(c),
            RIGHT_DOUBLE => {
                if stack.last() == Some(&LEFT_DOUBLE) {
                    stack.pop();
                } else {
                    stack.push(c);
                }
            }
            _ => {}
        }
    }

    if stack.is_empty() {
        Ok(())
    } else {
        Err(Warning::UnbalancedQuotes {
            context: strip_objects(&strip_sentinels(text)),
        })
    }
}
