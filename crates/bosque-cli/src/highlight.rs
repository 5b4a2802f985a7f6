//! Highlight command implementation for the Bosque kernel CLI.

use std::io::{self, Read};

use bosque_core::highlight::{Token, TokenKind, tokenize};
use clap::ValueEnum;

use crate::colors;

/// Output format of the highlight command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Source with terminal colors
    Ansi,
    /// Token list as JSON
    Json,
}

/// Highlight a source file, or stdin when `source_path` is `-`.
pub fn execute(source_path: &str, format: Format) -> anyhow::Result<()> {
    let source = if source_path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source_path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", source_path, e))?
    };

    match format {
        Format::Ansi => print!("{}", render_ansi(&source)),
        Format::Json => {
            let tokens: Vec<Token> = tokenize(&source).collect();
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
    }

    Ok(())
}

/// Escape sequence for a token kind, empty for plain text.
fn style(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Whitespace | TokenKind::Punctuation | TokenKind::Variable => "",
        TokenKind::Comment => colors::DIM,
        TokenKind::String => colors::GREEN,
        TokenKind::Keyword => colors::BLUE,
        TokenKind::Constant => colors::MAGENTA,
        TokenKind::Number => colors::YELLOW,
        TokenKind::TypeName => colors::CYAN,
        TokenKind::FunctionName | TokenKind::Operator => colors::BOLD,
    }
}

/// Render `source` with terminal colors.
///
/// Stripping the escape sequences from the result yields `source` again.
fn render_ansi(source: &str) -> String {
    let mut out = String::with_capacity(source.len() * 2);

    for token in tokenize(source) {
        let text = token.text(source);
        let style = style(token.kind);
        if style.is_empty() {
            out.push_str(text);
        } else {
            out.push_str(style);
            out.push_str(text);
            out.push_str(colors::RESET);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                // Skip to the terminating 'm'
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_render_preserves_text() {
        let source = "%% hi\nfunction main(): Int { return 1i + $x; }";
        assert_eq!(strip_ansi(&render_ansi(source)), source);
    }

    #[test]
    fn test_keyword_is_colored() {
        assert_eq!(
            render_ansi("if"),
            format!("{}if{}", colors::BLUE, colors::RESET)
        );
    }

    #[test]
    fn test_plain_kinds_are_unstyled() {
        assert_eq!(render_ansi("$x;"), "$x;");
    }
}
