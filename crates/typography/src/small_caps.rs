//! Acronyms wrapped for small-caps styling.

use quire_core::{Element, Node};

/// Class put on acronym wrappers.
pub const SMALL_CAPS_CLASS: &str = "small-caps";

/// Splits `text` into text nodes and `abbr.small-caps` elements.
///
/// An acronym is a whole word of two or more capitals or digits starting with
/// a capital. A plural `s` stays outside the wrapper: `GPUs` renders as
/// `<abbr class="small-caps">GPU</abbr>s`.
pub fn small_caps(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut plain_start = 0;

    for (start, word) in words(text) {
        let acronym = if is_acronym(word) {
            word
        } else {
            match word.strip_suffix('s') {
                Some(stem) if is_acronym(stem) => stem,
                _ => continue,
            }
        };

        if plain_start < start {
            nodes.push(Node::text(&text[plain_start..start]));
        }
        nodes.push(
            Element::new("abbr")
                .with_class(SMALL_CAPS_CLASS)
                .with_child(Node::text(acronym))
                .into(),
        );
        plain_start = start + acronym.len();
    }

    if plain_start < text.len() {
        nodes.push(Node::text(&text[plain_start..]));
    }
    nodes
}

fn is_acronym(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && word.len() >= 2
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Maximal alphanumeric runs with their byte offsets.
fn words(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut rest = text.char_indices().peekable();
    std::iter::from_fn(move || {
        let (start, _) = rest.find(|(_, c)| c.is_alphanumeric())?;
        let mut end = text.len();
        while let Some(&(index, c)) = rest.peek() {
            if !c.is_alphanumeric() {
                end = index;
                break;
            }
            rest.next();
        }
        Some((start, &text[start..end]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_core::Root;

    fn html(text: &str) -> String {
        quire_core::to_html(&Root::new(small_caps(text)))
    }

    #[test]
    fn wraps_acronyms() {
        assert_eq!(
            html("How RL shapes AI"),
            r#"How <abbr class="small-caps">RL</abbr> shapes <abbr class="small-caps">AI</abbr>"#
        );
        assert_eq!(html("GPT4 rules"), r#"<abbr class="small-caps">GPT4</abbr> rules"#);
    }

    #[test]
    fn plural_s_stays_outside() {
        assert_eq!(html("LLMs"), r#"<abbr class="small-caps">LLM</abbr>s"#);
    }

    #[test]
    fn ordinary_words_are_left_alone() {
        assert_eq!(small_caps("A quiet Day"), vec![Node::text("A quiet Day")]);
        assert_eq!(small_caps("4K video"), vec![Node::text("4K video")]);
        assert_eq!(small_caps("NASAish"), vec![Node::text("NASAish")]);
        assert!(small_caps("").is_empty());
    }
}
