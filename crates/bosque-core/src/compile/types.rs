//! Common types for the compile-and-run pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the compiler command.
pub const COMPILER_ENV: &str = "BOSQUE_KERNEL_COMPILER";

/// Environment variable overriding the runtime command.
pub const RUNTIME_ENV: &str = "BOSQUE_KERNEL_RUNTIME";

/// Environment variable setting a per-process timeout in seconds.
pub const TIMEOUT_ENV: &str = "BOSQUE_KERNEL_TIMEOUT_SECS";

/// Configuration for the compiler/runtime bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Compiler command (name looked up on PATH, or a path)
    pub compiler: String,

    /// JavaScript runtime command (name looked up on PATH, or a path)
    pub runtime: String,

    /// File name of the entry module the compiler is expected to emit
    pub entry_module: String,

    /// File name the cell source is written to
    pub source_file: String,

    /// Name of the directory the compiler writes modules into
    pub output_dir: String,

    /// Upper bound on each child process, `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            compiler: "bosque".to_string(),
            runtime: "node".to_string(),
            entry_module: "Main.mjs".to_string(),
            source_file: "source.bsq".to_string(),
            output_dir: "jsout".to_string(),
            timeout: None,
        }
    }
}

impl BridgeConfig {
    /// Defaults, overridden by the `BOSQUE_KERNEL_*` environment variables.
    ///
    /// Unparseable timeout values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(compiler) = std::env::var(COMPILER_ENV)
            && !compiler.trim().is_empty()
        {
            config.compiler = compiler;
        }

        if let Ok(runtime) = std::env::var(RUNTIME_ENV)
            && !runtime.trim().is_empty()
        {
            config.runtime = runtime;
        }

        if let Ok(secs) = std::env::var(TIMEOUT_ENV) {
            match secs.trim().parse::<u64>() {
                Ok(0) => config.timeout = None,
                Ok(secs) => config.timeout = Some(Duration::from_secs(secs)),
                Err(e) => tracing::warn!("Ignoring {}={:?}: {}", TIMEOUT_ENV, secs, e),
            }
        }

        config
    }

    /// Use a different compiler command.
    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    /// Use a different runtime command.
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// Bound each child process by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the source file inside `work_dir`.
    pub fn source_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.source_file)
    }

    /// Path of the output directory inside `work_dir`.
    pub fn output_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.output_dir)
    }
}

/// Which child process a step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Execute,
}

impl Stage {
    /// Human readable name for log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Execute => "execute",
        }
    }
}

/// Captured result of one child process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,
}

impl ProcessOutput {
    /// Returns true if the process exited with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Trimmed stderr, or `fallback` when stderr holds no text.
    pub fn diagnostic_or(&self, fallback: &str) -> String {
        let trimmed = self.stderr.trim();
        if trimmed.is_empty() {
            fallback.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.compiler, "bosque");
        assert_eq!(config.runtime, "node");
        assert_eq!(config.entry_module, "Main.mjs");
        assert_eq!(config.source_file, "source.bsq");
        assert_eq!(config.output_dir, "jsout");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_layout_paths() {
        let config = BridgeConfig::default();
        let work = Path::new("/tmp/work");
        assert_eq!(config.source_path(work), PathBuf::from("/tmp/work/source.bsq"));
        assert_eq!(config.output_path(work), PathBuf::from("/tmp/work/jsout"));
    }

    #[test]
    fn test_diagnostic_fallback() {
        let output = ProcessOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: "  \n".to_string(),
        };
        assert!(!output.success());
        assert_eq!(output.diagnostic_or("generic"), "generic");

        let output = ProcessOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: "boom\n".to_string(),
        };
        assert_eq!(output.diagnostic_or("generic"), "boom");
    }
}
