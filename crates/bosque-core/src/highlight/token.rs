//! Token types produced by the highlighter.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Classification of a source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Whitespace,
    Comment,
    String,
    Keyword,
    Constant,
    Number,
    TypeName,
    Variable,
    FunctionName,
    Operator,
    Punctuation,
}

impl TokenKind {
    /// Every kind, in rule priority order.
    pub const ALL: [TokenKind; 11] = [
        Self::Whitespace,
        Self::Comment,
        Self::String,
        Self::Keyword,
        Self::Constant,
        Self::Number,
        Self::TypeName,
        Self::Variable,
        Self::FunctionName,
        Self::Operator,
        Self::Punctuation,
    ];

    /// Stable lowercase name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::String => "string",
            Self::Keyword => "keyword",
            Self::Constant => "constant",
            Self::Number => "number",
            Self::TypeName => "type_name",
            Self::Variable => "variable",
            Self::FunctionName => "function_name",
            Self::Operator => "operator",
            Self::Punctuation => "punctuation",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified byte range of the scanned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token classification
    pub kind: TokenKind,

    /// Start byte offset (inclusive)
    pub start: usize,

    /// End byte offset (exclusive)
    pub end: usize,
}

impl Token {
    /// Create a token covering `start..end`.
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    /// Byte range covered by this token.
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Tokens produced by the lexer are never empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The slice of `source` this token covers.
    ///
    /// `source` must be the text the token was produced from.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span()]
    }
}
