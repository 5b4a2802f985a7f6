//! Regex-driven Bosque lexer.
//!
//! At every position the rules are tried in priority order and the first
//! one that matches decides the token. Characters no rule accepts are
//! emitted as single-character punctuation so the token stream always
//! covers the whole input.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ScanError;

use super::token::{Token, TokenKind};

/// Keywords introducing control flow and contracts.
pub const CONTROL_KEYWORDS: &[&str] = &[
    "abort", "assert", "if", "elif", "else", "fn", "pred", "let", "match", "ref", "return",
    "switch", "then", "var", "yield", "ensures", "invariant", "example", "requires", "validate",
    "softcheck", "errtest", "chektest",
];

/// Declaration and modifier keywords.
pub const DECLARATION_KEYWORDS: &[&str] = &[
    "recursive", "action", "_debug", "bsqon", "do", "fail", "implements", "debug", "release",
    "safety", "spec", "test", "api", "as", "concept", "const", "declare", "enum", "entity",
    "field", "function", "method", "namespace", "of", "provides", "in", "task", "datatype",
    "using", "when", "event", "status", "resource", "predicate", "operator", "variant",
];

/// Reserved literal names.
pub const CONSTANTS: &[&str] = &[
    "none", "true", "false", "fail", "ok", "some", "result", "option", "env", "this", "self",
];

/// One lexing rule.
struct Rule {
    kind: TokenKind,

    /// Anchored pattern; when it has a capture group, only group 1 is consumed.
    regex: Regex,

    /// Rule only applies at the start of a word.
    word_start: bool,
}

impl Rule {
    fn new(kind: TokenKind, pattern: &str, word_start: bool) -> Self {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid {} pattern {:?}: {}", kind, pattern, e));
        Self {
            kind,
            regex,
            word_start,
        }
    }

    /// Length of the match at the start of `rest`, if any.
    fn match_len(&self, rest: &str) -> Option<usize> {
        if self.regex.captures_len() > 1 {
            let caps = self.regex.captures(rest)?;
            caps.get(1).map(|m| m.end())
        } else {
            self.regex.find(rest).map(|m| m.end())
        }
    }
}

fn word_alternation(words: &[&str]) -> String {
    format!(r"^(?:{})\b", words.join("|"))
}

fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        let keywords: Vec<&str> = CONTROL_KEYWORDS
            .iter()
            .chain(DECLARATION_KEYWORDS)
            .copied()
            .collect();

        vec![
            Rule::new(TokenKind::Whitespace, r"^\s+", false),
            Rule::new(TokenKind::Comment, r"^%%[^\n]*", false),
            // %** ... *% and %* ... *%, unterminated runs to the end
            Rule::new(TokenKind::Comment, r"(?s)^%\*\*?.*?(?:\*%|\z)", false),
            Rule::new(TokenKind::String, r#"(?s)^"(?:[^"\\]|\\.)*(?:"|\\?\z)"#, false),
            Rule::new(TokenKind::String, r"(?s)^'(?:[^'\\]|\\.)*(?:'|\\?\z)", false),
            Rule::new(TokenKind::Keyword, &word_alternation(&keywords), true),
            Rule::new(TokenKind::Constant, &word_alternation(CONSTANTS), true),
            Rule::new(
                TokenKind::Number,
                concat!(
                    r"^(?:[0-9]+[inIN]\b",
                    r"|[0-9]+R\b",
                    r"|[0-9]+/[0-9]+R\b",
                    r"|[0-9]+\.[0-9]+(?:[eE][-+]?[0-9]+)?[fd]?\b",
                    r"|[0-9]+\b)",
                ),
                true,
            ),
            Rule::new(
                TokenKind::TypeName,
                r"^(?:(?:[A-Z][_a-zA-Z0-9]+::)*[A-Z][_a-zA-Z0-9]+\b|[A-Z]\b)",
                true,
            ),
            Rule::new(TokenKind::Variable, r"^(?:\$?[_a-z][_a-zA-Z0-9]*\b|\$)", true),
            Rule::new(TokenKind::FunctionName, r"^([a-zA-Z_][a-zA-Z0-9_]*)\s*\(", true),
            Rule::new(TokenKind::Operator, r"^[-+*/=<>!&|?:.^~@#]+", false),
            Rule::new(TokenKind::Punctuation, r"^[{}()\[\];,]", false),
        ]
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lazy token stream over a source text.
///
/// Cloning a lexer snapshots its position; [`reset`](Self::reset)
/// restarts the scan from the beginning.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer positioned at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// The text being scanned.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Byte offset of the next token.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Restart the scan from offset 0.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    fn at_word_start(&self) -> bool {
        self.source[..self.pos]
            .chars()
            .next_back()
            .is_none_or(|c| !is_word_char(c))
    }

    fn next_token(&self) -> Token {
        let rest = &self.source[self.pos..];
        let word_start = self.at_word_start();

        for rule in rules() {
            if rule.word_start && !word_start {
                continue;
            }
            if let Some(len) = rule.match_len(rest)
                && len > 0
            {
                return Token::new(rule.kind, self.pos, self.pos + len);
            }
        }

        // Nothing matched: recover by consuming one character
        let ch = rest.chars().next().unwrap_or_default();
        let error = ScanError {
            offset: self.pos,
            ch,
        };
        tracing::trace!("{}", error);
        Token::new(TokenKind::Punctuation, self.pos, self.pos + ch.len_utf8())
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.pos >= self.source.len() {
            return None;
        }
        let token = self.next_token();
        self.pos = token.end;
        Some(token)
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

/// Tokenize `source` lazily.
pub fn tokenize(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}
