//! Full-width slashes.

use crate::marked::{Edit, MarkedText, OBJECT, apply_marked};

/// `／`
pub const FULL_WIDTH_SLASH: char = '\u{FF0F}';

/// Replaces a spaced ` / ` between words with ` ／ `.
///
/// ```
/// use quire_typography::transform::slashes::full_width_slashes;
///
/// assert_eq!(full_width_slashes("a / b"), "a ／ b");
/// assert_eq!(full_width_slashes("12 / 7"), "12 / 7");
/// ```
pub fn full_width_slashes(text: &str) -> String {
    apply_marked(text, full_width_slashes_marked)
}

/// `full_width_slashes` over merged text.
pub fn full_width_slashes_marked(text: &MarkedText) -> MarkedText {
    let chars = text.chars();
    let mut edits = vec![Edit::Keep; chars.len()];

    for (slash, _) in chars.iter().enumerate().filter(|(_, c)| **c == '/') {
        let before = slash - chars[..slash].iter().rev().take_while(|c| **c == ' ').count();
        let after = slash + 1 + chars[slash + 1..].iter().take_while(|c| **c == ' ').count();
        if before == slash || after == slash + 1 {
            continue;
        }

        let prev = before.checked_sub(1).map(|i| chars[i]);
        let next = chars.get(after).copied();
        if !(prev.is_some_and(is_slash_neighbour) && next.is_some_and(is_slash_neighbour)) {
            continue;
        }

        for edit in &mut edits[before + 1..slash] {
            *edit = Edit::Delete;
        }
        for edit in &mut edits[slash + 2..after] {
            *edit = Edit::Delete;
        }
        edits[slash] = Edit::Replace(FULL_WIDTH_SLASH.to_string());
    }

    text.rewrite(|_, i| std::mem::replace(&mut edits[i], Edit::Keep))
}

/// Code or math next to the slash may be a fraction, so `OBJECT` does not count.
fn is_slash_neighbour(c: char) -> bool {
    !(c.is_ascii_digit() || c.is_whitespace() || c == '/' || c == OBJECT)
}
