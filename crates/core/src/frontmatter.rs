use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Typed view of a post's YAML frontmatter.
///
/// Only the keys the pipeline acts on are typed; everything else is kept in
/// `extra` for the host to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Post title.
    #[serde(default)]
    pub title: Option<String>,
    /// Whether a table of contents is rendered for this post.
    #[serde(default = "default_toc")]
    pub toc: bool,
    /// Skips the typography passes for this post.
    #[serde(default)]
    pub no_formatting: bool,
    /// Remaining keys, untouched.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

fn default_toc() -> bool {
    true
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            title: None,
            toc: default_toc(),
            no_formatting: false,
            extra: Map::new(),
        }
    }
}

/// Frontmatter plus the position of the body.
#[derive(Debug)]
pub struct FrontmatterExtraction {
    /// Parsed frontmatter.
    pub frontmatter: Frontmatter,
    /// Where the Markdown body starts, as a byte offset into the input.
    pub body_start: usize,
}

/// Why a frontmatter block could not be read.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// No closing `---` line.
    #[error("frontmatter block is missing its closing '---'")]
    Unterminated,
    /// YAML failed to parse or did not match the expected field types.
    #[error("invalid frontmatter: {0}")]
    Parse(String),
    /// The block is valid YAML but not a mapping.
    #[error("frontmatter must be a YAML mapping")]
    InvalidRootType,
}

/// Splits a leading `---` YAML block off a post and reads it.
pub fn extract_frontmatter(input: &str) -> Result<FrontmatterExtraction, FrontmatterError> {
    let Some((block, body_start)) = find_yaml_block(input)? else {
        return Ok(FrontmatterExtraction {
            frontmatter: Frontmatter::default(),
            body_start: 0,
        });
    };

    let fields = parse_yaml_block(block)?;
    let frontmatter = serde_json::from_value(JsonValue::Object(fields))
        .map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    Ok(FrontmatterExtraction {
        frontmatter,
        body_start,
    })
}

fn parse_yaml_block(block: &str) -> Result<Map<String, JsonValue>, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Map::new());
    }

    let yaml: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    match serde_json::to_value(yaml).map_err(|err| FrontmatterError::Parse(err.to_string()))? {
        JsonValue::Null => Ok(Map::new()),
        JsonValue::Object(fields) => Ok(fields),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

/// Finds the `---` fenced block, skipping a BOM and leading blank lines.
///
/// Returns the block text and the byte offset of the first body line.
fn find_yaml_block(input: &str) -> Result<Option<(&str, usize)>, FrontmatterError> {
    let bom_len = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };

    let mut lines = Lines {
        input,
        cursor: bom_len,
    };
    let opening = loop {
        match lines.next() {
            Some((line, _)) if line.trim().is_empty() => continue,
            Some((line, _)) if is_yaml_fence(line) => break lines.cursor,
            _ => return Ok(None),
        }
    };

    while let Some((line, line_start)) = lines.next() {
        if is_yaml_fence(line) {
            let block = input[opening..line_start].trim_end_matches(['\r', '\n']);
            return Ok(Some((block, lines.cursor)));
        }
    }
    Err(FrontmatterError::Unterminated)
}

/// Line iterator yielding each line and its start offset.
struct Lines<'a> {
    input: &'a str,
    cursor: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = (&'a str, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor;
        if start >= self.input.len() {
            return None;
        }
        let rest = &self.input[start..];
        let (line, advance) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], pos + 1),
            None => (rest, rest.len()),
        };
        self.cursor = start + advance;
        Some((line, start))
    }
}

fn is_yaml_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}
