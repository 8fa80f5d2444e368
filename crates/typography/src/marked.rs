//! Text with node boundaries.
//!
//! Merged block text carries one `SENTINEL` after each text node. Rules never
//! see the sentinels: a `MarkedText` stores the visible characters plus how
//! many boundaries sit before each of them, and rules rebuild their output by
//! copying every boundary count exactly once. A rule written against
//! `MarkedText` therefore cannot add, drop or reorder boundaries, and its
//! visible output cannot depend on where the boundaries are.

/// Boundary marker appended after each text node while merging (private use
/// area, never present in ordinary text).
pub const SENTINEL: char = '\u{E000}';

/// Stands in for an inline element whose text is not merged (code, math, a
/// link under the slash rule, `<br>`, images).
///
/// Rules see it as an ordinary visible character that is neither a word
/// character nor whitespace, so spacing around the element is kept. It is
/// removed again before the merged text is split.
pub const OBJECT: char = '\u{FFFC}';

/// Removes all boundary markers.
pub fn strip_sentinels(text: &str) -> String {
    text.chars().filter(|c| *c != SENTINEL).collect()
}

/// Counts boundary markers.
pub fn count_sentinels(text: &str) -> usize {
    text.chars().filter(|c| *c == SENTINEL).count()
}

/// Removes object placeholders.
pub fn strip_objects(text: &str) -> String {
    text.chars().filter(|c| *c != OBJECT).collect()
}

/// Counts object placeholders.
pub fn count_objects(text: &str) -> usize {
    text.chars().filter(|c| *c == OBJECT).count()
}

/// Visible characters plus the boundaries between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedText {
    chars: Vec<char>,
    /// `marks[i]` boundaries precede `chars[i]`; the last entry trails the text.
    marks: Vec<usize>,
}

impl Default for MarkedText {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkedText {
    /// Empty text with no boundaries.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Empty text with room for `capacity` characters.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut marks = Vec::with_capacity(capacity + 1);
        marks.push(0);
        Self {
            chars: Vec::with_capacity(capacity),
            marks,
        }
    }

    /// Reads a merged string, turning each `SENTINEL` into a boundary.
    pub fn parse(text: &str) -> Self {
        let mut marked = Self::with_capacity(text.len());
        for c in text.chars() {
            if c == SENTINEL {
                marked.push_boundaries(1);
            } else {
                marked.push(c);
            }
        }
        marked
    }

    /// Writes the text back out with one `SENTINEL` per boundary.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.chars.len() + self.boundary_count());
        for (c, marks) in self.chars.iter().zip(&self.marks) {
            out.extend(std::iter::repeat_n(SENTINEL, *marks));
            out.push(*c);
        }
        out.extend(std::iter::repeat_n(SENTINEL, self.trailing_marks()));
        out
    }

    /// The visible text.
    pub fn visible(&self) -> String {
        self.chars.iter().collect()
    }

    /// Visible characters.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Number of visible characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// True if there are no visible characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Visible character at `index`.
    pub fn get(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Visible character before `index`.
    pub fn before(&self, index: usize) -> Option<char> {
        index.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Boundaries immediately before the character at `index` (or trailing the
    /// text when `index == len()`).
    pub fn marks_before(&self, index: usize) -> usize {
        self.marks.get(index).copied().unwrap_or(0)
    }

    /// Boundaries after the last character.
    pub fn trailing_marks(&self) -> usize {
        self.marks.last().copied().unwrap_or(0)
    }

    /// Total number of boundaries.
    pub fn boundary_count(&self) -> usize {
        self.marks.iter().sum()
    }

    /// Appends a visible character.
    pub fn push(&mut self, c: char) {
        self.chars.push(c);
        self.marks.push(0);
    }

    /// Appends visible characters.
    pub fn push_str(&mut self, s: &str) {
        for c in s.chars() {
            self.push(c);
        }
    }

    /// Appends boundaries after the current last character.
    pub fn push_boundaries(&mut self, count: usize) {
        if let Some(last) = self.marks.last_mut() {
            *last += count;
        }
    }

    /// Copies the boundaries before `index` in `source`, then the character at
    /// `index` (if any). The usual way a rule passes a position through.
    pub fn copy_from(&mut self, source: &MarkedText, index: usize) {
        self.push_boundaries(source.marks_before(index));
        if let Some(c) = source.get(index) {
            self.push(c);
        }
    }

    /// Rebuilds the text, replacing individual characters. Boundaries stay put.
    pub fn map_chars(&self, mut f: impl FnMut(&MarkedText, usize) -> char) -> MarkedText {
        let mut out = MarkedText::with_capacity(self.len());
        for index in 0..self.len() {
            out.push_boundaries(self.marks_before(index));
            out.push(f(self, index));
        }
        out.push_boundaries(self.trailing_marks());
        out
    }

    /// Rebuilds the text with per-position edits.
    ///
    /// `edit(source, index)` decides what happens to the character at `index`;
    /// boundaries before every position are always copied.
    pub fn rewrite(&self, mut edit: impl FnMut(&MarkedText, usize) -> Edit) -> MarkedText {
        let mut out = MarkedText::with_capacity(self.len());
        for index in 0..self.len() {
            out.push_boundaries(self.marks_before(index));
            match edit(self, index) {
                Edit::Keep => out.push(self.chars[index]),
                Edit::Delete => {}
                Edit::Replace(s) => out.push_str(&s),
            }
        }
        out.push_boundaries(self.trailing_marks());
        out
    }
}

/// What `MarkedText::rewrite` does with one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Leave the character as is.
    Keep,
    /// Drop the character (its boundaries are kept).
    Delete,
    /// Emit this text in place of the character.
    Replace(String),
}

/// Applies a `MarkedText` rule to a string that may contain sentinels.
pub fn apply_marked(text: &str, rule: impl FnOnce(&MarkedText) -> MarkedText) -> String {
    rule(&MarkedText::parse(text)).render()
}
