use crate::frontmatter::FrontmatterError;
use thiserror::Error;

/// Line and column in a Markdown source, 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Location without a file name.
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Location inside a named file.
    pub fn with_file(file: String, line: usize, column: usize) -> Self {
        Self {
            file: Some(file),
            line,
            column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that abort processing of a document.
#[derive(Debug, Error)]
pub enum QuireError {
    /// IO error while reading sources or writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// markdown-rs rejected the source.
    #[error("{location}: {message}")]
    Parse {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// Frontmatter could not be extracted.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// A rewrite rule changed the number of node boundaries in merged text.
    ///
    /// This is a bug in the rule, not in the document.
    #[error("rule `{rule}` produced {found} text segments for {expected} text nodes")]
    BoundaryMismatch {
        /// Rule that was being applied
        rule: String,
        /// Number of text nodes that were merged
        expected: usize,
        /// Number of segments found after the rule ran
        found: usize,
    },
    /// A rewrite rule behaved differently on merged text than on plain text.
    #[error("rule `{rule}` is not boundary-invariant: {marked:?} != {plain:?}")]
    InvarianceViolation {
        /// Rule that was being applied
        rule: String,
        /// Rule output on merged text, boundaries stripped
        marked: String,
        /// Rule output on the same text without boundaries
        plain: String,
    },
    /// A rewrite rule dropped or duplicated an inline element placeholder.
    ///
    /// This is a bug in the rule, not in the document.
    #[error("rule `{rule}` kept {found} of {expected} inline element placeholders")]
    InlineObjectMismatch {
        /// Rule that was being applied
        rule: String,
        /// Placeholders in the merged text
        expected: usize,
        /// Placeholders found after the rule ran
        found: usize,
    },
    /// Emphasis conversion was asked for a tag it does not produce.
    #[error("unknown emphasis tag `{0}` (expected `strong` or `em`)")]
    UnknownEmphasisTag(String),
    /// Anything else that should not happen.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QuireError {
    /// `QuireError::Parse` at `line:column`.
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }
}

/// Non-fatal problems found while processing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Curly double quotes do not pair up after smart-quote conversion.
    UnbalancedQuotes {
        /// Text of the block that failed the check
        context: String,
    },
    /// A markdown node type the converter has no output for.
    UnsupportedNode {
        /// Node type name
        kind: String,
        /// Where the node started, when known
        location: Option<SourceLocation>,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnbalancedQuotes { context } => {
                write!(f, "mismatched quotes in '{}'", context)
            }
            Warning::UnsupportedNode {
                kind,
                location: Some(location),
            } => write!(f, "{}: unsupported markdown node `{}`", location, kind),
            Warning::UnsupportedNode {
                kind,
                location: None,
            } => write!(f, "unsupported markdown node `{}`", kind),
        }
    }
}

/// Per-document diagnostics sink.
///
/// Created by the caller for each document and passed to every pass that can
/// report something. Each warning is recorded and forwarded to the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    source: Option<String>,
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Sink for an unnamed document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostics collection that names its document in log output.
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            warnings: Vec::new(),
        }
    }

    /// Record a warning and log it.
    pub fn warn(&mut self, warning: Warning) {
        match &self.source {
            Some(source) => log::warn!("{}: {}", source, warning),
            None => log::warn!("{}", warning),
        }
        self.warnings.push(warning);
    }

    /// Warnings recorded so far, in order.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Whether anything was reported.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of warnings recorded.
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display_with_and_without_file() {
        assert_eq!(SourceLocation::new(3, 7).to_string(), "3:7");
        assert_eq!(
            SourceLocation::with_file("post.md".into(), 3, 7).to_string(),
            "post.md:3:7"
        );
    }

    #[test]
    fn diagnostics_record_warnings_in_order() {
        let mut diagnostics = Diagnostics::for_source("post.md");
        diagnostics.warn(Warning::UnbalancedQuotes {
            context: "“open".into(),
        });
        diagnostics.warn(Warning::UnsupportedNode {
            kind: "Html".into(),
            location: Some(SourceLocation::new(1, 1)),
        });

        assert_eq!(diagnostics.count(), 2);
        assert!(matches!(
            diagnostics.warnings()[0],
            Warning::UnbalancedQuotes { .. }
        ));
        assert_eq!(
            diagnostics.warnings()[1].to_string(),
            "1:1: unsupported markdown node `Html`"
        );
    }

    #[test]
    fn boundary_mismatch_message_names_rule() {
        let err = QuireError::BoundaryMismatch {
            rule: "smart-quotes".into(),
            expected: 3,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "rule `smart-quotes` produced 2 text segments for 3 text nodes"
        );
    }
}
