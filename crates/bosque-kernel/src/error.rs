//! Error types for the Bosque kernel.

use std::path::PathBuf;

/// Kernel error type.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// IO error.
    #[error("IO error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Bosque core error.
    #[error("Core error: {0}")]
    Core(#[from] bosque_core::Error),

    /// The session has been shut down.
    #[error("Session terminated")]
    SessionTerminated,

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Kernel spec could not be installed.
    #[error("Kernel spec error: {0}")]
    KernelSpec(String),
}

impl From<std::io::Error> for KernelError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            message: e.to_string(),
        }
    }
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;
