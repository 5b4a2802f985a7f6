//! Syntax highlighting for Bosque source.
//!
//! The lexer classifies every byte of its input into one of the
//! [`TokenKind`]s; it never fails and never touches the execution path.

mod lexer;
mod token;

pub use lexer::{CONSTANTS, CONTROL_KEYWORDS, DECLARATION_KEYWORDS, Lexer, tokenize};
pub use token::{Token, TokenKind};
