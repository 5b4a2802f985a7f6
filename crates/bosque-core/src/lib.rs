//! Core engine for the Bosque notebook kernel.
//!
//! This crate provides:
//! - Toolchain resolution for the Bosque compiler and JavaScript runtime
//! - The compile-and-run bridge used for every notebook cell
//! - Per-session scratch workspaces
//! - A regex-driven lexer for syntax highlighting

pub mod compile;
pub mod error;
pub mod highlight;
pub mod paths;

pub use compile::{Bridge, BridgeConfig, ToolchainManager};
pub use error::{Error, Result, ScanError};
pub use highlight::{Lexer, Token, TokenKind, tokenize};
pub use paths::ScratchWorkspace;
