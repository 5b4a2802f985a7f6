//! Error types for bosque-core.

use thiserror::Error;

/// Result type for bosque-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message used when the compiler fails without writing to stderr.
pub const GENERIC_COMPILATION_MESSAGE: &str = "Unknown compilation error.";

/// Message used when the runtime fails without writing to stderr.
pub const GENERIC_EXECUTION_MESSAGE: &str = "Unknown execution error.";

/// Errors that can occur in bosque-core.
#[derive(Debug, Error)]
pub enum Error {
    /// The compiler rejected the source, or produced no usable output.
    #[error("Compilation failed: {0}")]
    Compilation(String),

    /// The generated module failed at runtime.
    #[error("Execution failed: {0}")]
    Execution(String),

    /// A required executable is missing, or the scratch directory
    /// could not be created or written.
    #[error("environment error: {0}")]
    Environment(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Protocol-facing name of the error class.
    ///
    /// IO failures inside the pipeline count as environment problems:
    /// the scratch directory became unwritable.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Compilation(_) => "CompilationError",
            Self::Execution(_) => "ExecutionError",
            Self::Environment(_) | Self::Io(_) => "EnvironmentError",
        }
    }

    /// Whether the session can keep serving requests after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Compilation(_) | Self::Execution(_))
    }

    /// Render the error together with a recovery hint for terminal output.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Self::Compilation(_) => "check the cell source; the message above is the compiler's stderr",
            Self::Execution(_) => "the generated JavaScript failed; the message above is the runtime's stderr",
            Self::Environment(_) => {
                "make sure `bosque` and `node` are on PATH, or pass --compiler / --runtime"
            }
            Self::Io(_) => "check that the temporary directory is writable",
        };
        format!("{self}\n  hint: {hint}")
    }
}

/// An unrecognized character met by the highlighter.
///
/// The lexer recovers from these locally and only logs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unrecognized character {ch:?} at offset {offset}")]
pub struct ScanError {
    /// Byte offset of the character in the scanned source.
    pub offset: usize,

    /// The character that matched no rule.
    pub ch: char,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Error::Compilation("x".into()).kind(), "CompilationError");
        assert_eq!(Error::Execution("x".into()).kind(), "ExecutionError");
        assert_eq!(Error::Environment("x".into()).kind(), "EnvironmentError");
    }

    #[test]
    fn test_recoverable() {
        assert!(Error::Compilation("x".into()).is_recoverable());
        assert!(Error::Execution("x".into()).is_recoverable());
        assert!(!Error::Environment("x".into()).is_recoverable());
    }

    #[test]
    fn test_display_carries_diagnostic() {
        let err = Error::Compilation("parse error at line 3".into());
        assert_eq!(err.to_string(), "Compilation failed: parse error at line 3");
        assert!(err.with_hint().contains("hint:"));
    }
}
