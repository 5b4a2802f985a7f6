//! Toolchain resolution for the Bosque kernel.
//!
//! Locates the Bosque compiler and the JavaScript runtime on PATH.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::types::BridgeConfig;

/// Resolved paths of the two external executables.
#[derive(Debug, Clone)]
pub struct ToolchainManager {
    /// Path to the Bosque compiler
    compiler_path: PathBuf,

    /// Path to the JavaScript runtime
    runtime_path: PathBuf,
}

impl ToolchainManager {
    /// Resolve both executables named in `config`.
    ///
    /// # Errors
    /// Returns [`Error::Environment`] naming the first executable that
    /// cannot be found.
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        tracing::debug!(
            "Environment PATH: {}",
            std::env::var("PATH").unwrap_or_default()
        );

        let compiler_path = Self::find(&config.compiler)?;
        tracing::debug!("'{}' executable found at: {}", config.compiler, compiler_path.display());

        let runtime_path = Self::find(&config.runtime)?;
        tracing::debug!("'{}' executable found at: {}", config.runtime, runtime_path.display());

        Ok(Self {
            compiler_path,
            runtime_path,
        })
    }

    /// Build a manager from already known paths, skipping the PATH lookup.
    pub fn from_paths(compiler_path: impl Into<PathBuf>, runtime_path: impl Into<PathBuf>) -> Self {
        Self {
            compiler_path: compiler_path.into(),
            runtime_path: runtime_path.into(),
        }
    }

    /// Get the compiler path.
    pub fn compiler_path(&self) -> &Path {
        &self.compiler_path
    }

    /// Get the runtime path.
    pub fn runtime_path(&self) -> &Path {
        &self.runtime_path
    }

    /// Find a command in PATH (or check an explicit path).
    fn find(command: &str) -> Result<PathBuf> {
        which::which(command).map_err(|_| {
            Error::Environment(format!("'{}' executable not found in PATH.", command))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_compiler_is_environment_error() {
        let config = BridgeConfig::default().with_compiler("bosque-definitely-not-installed-3f9a");
        let err = ToolchainManager::new(&config).unwrap_err();

        assert!(matches!(err, Error::Environment(_)));
        assert!(err.to_string().contains("bosque-definitely-not-installed-3f9a"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolves_absolute_paths() {
        let config = BridgeConfig::default()
            .with_compiler("/bin/sh")
            .with_runtime("/bin/sh");
        let toolchain = ToolchainManager::new(&config).expect("/bin/sh should resolve");

        assert_eq!(toolchain.compiler_path(), Path::new("/bin/sh"));
        assert_eq!(toolchain.runtime_path(), Path::new("/bin/sh"));
    }
}
