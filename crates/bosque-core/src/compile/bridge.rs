//! Compiler/runtime bridge.
//!
//! Runs one cell through the external toolchain:
//!
//! ```text
//! source.bsq ──► bosque ──► jsout/Main.mjs ──► node ──► stdout
//! ```
//!
//! Both child processes run with the scratch directory as their working
//! directory and strictly one after the other.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, GENERIC_COMPILATION_MESSAGE, GENERIC_EXECUTION_MESSAGE, Result};
use crate::paths::{recreate_dir, remove_path};

use super::command::run_captured;
use super::toolchain::ToolchainManager;
use super::types::{BridgeConfig, Stage};

/// Module extensions accepted as fallback entry points, in preference order.
const MODULE_EXTENSIONS: [&str; 2] = ["mjs", "js"];

/// Compiles Bosque source to JavaScript and runs the result.
#[derive(Debug, Clone)]
pub struct Bridge {
    /// Bridge configuration
    config: BridgeConfig,

    /// Resolved executables
    toolchain: ToolchainManager,
}

impl Bridge {
    /// Create a bridge, resolving both executables on PATH.
    ///
    /// # Errors
    /// Returns [`Error::Environment`] if either executable is missing.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        let toolchain = ToolchainManager::new(&config)?;
        Ok(Self { config, toolchain })
    }

    /// Create a bridge from an already resolved toolchain.
    pub fn with_toolchain(config: BridgeConfig, toolchain: ToolchainManager) -> Self {
        Self { config, toolchain }
    }

    /// Get the bridge configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Get the resolved toolchain.
    pub fn toolchain(&self) -> &ToolchainManager {
        &self.toolchain
    }

    /// Compile `source` and run the generated entry module.
    ///
    /// Returns the runtime's standard output.
    pub async fn compile_and_execute(&self, source: &str, work_dir: &Path) -> Result<String> {
        tracing::debug!("Starting compilation and execution of Bosque code.");
        let output_dir = self.compile(source, work_dir).await?;
        let entry = self.find_entry_module(&output_dir)?;
        self.execute(&entry, work_dir).await
    }

    /// Write `source` into `work_dir` and run the compiler on it.
    ///
    /// The output directory is emptied before the compiler runs so that
    /// modules from an earlier cell can never be picked up. The source file
    /// is deleted once the compiler exits, whatever the outcome.
    ///
    /// Returns the output directory.
    pub async fn compile(&self, source: &str, work_dir: &Path) -> Result<PathBuf> {
        let source_path = self.config.source_path(work_dir);
        let output_dir = self.config.output_path(work_dir);

        // An earlier cell may have left anything under these names
        recreate_dir(&output_dir)?;
        remove_path(&source_path)?;

        let result = match tokio::fs::write(&source_path, source).await {
            Ok(()) => {
                run_captured(
                    Stage::Compile,
                    self.toolchain.compiler_path(),
                    &source_path,
                    work_dir,
                    self.config.timeout,
                )
                .await
            }
            Err(e) => Err(e.into()),
        };

        let removed = remove_path(&source_path);
        if let Err(ref e) = removed {
            tracing::warn!("Failed to remove {}: {}", source_path.display(), e);
        }

        let output = result?;
        removed?;

        if !output.success() {
            return Err(Error::Compilation(output.diagnostic_or(GENERIC_COMPILATION_MESSAGE)));
        }

        if !output_dir.is_dir() {
            return Err(Error::Compilation(format!(
                "output directory '{}' was not created.",
                output_dir.display()
            )));
        }

        Ok(output_dir)
    }

    /// Pick the module to hand to the runtime.
    ///
    /// Prefers the configured entry module. Otherwise takes the
    /// lexicographically first `.mjs` file, then the first `.js` file.
    pub fn find_entry_module(&self, output_dir: &Path) -> Result<PathBuf> {
        let main = output_dir.join(&self.config.entry_module);
        if main.is_file() {
            return Ok(main);
        }

        let mut candidates: Vec<PathBuf> = fs::read_dir(output_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| module_rank(path).is_some())
            .collect();

        candidates.sort_by(|a, b| {
            module_rank(a)
                .cmp(&module_rank(b))
                .then_with(|| a.file_name().cmp(&b.file_name()))
        });

        match candidates.into_iter().next() {
            Some(fallback) => {
                tracing::debug!(
                    "'{}' not emitted, falling back to {}",
                    self.config.entry_module,
                    fallback.display()
                );
                Ok(fallback)
            }
            None => Err(Error::Compilation(format!(
                "Main JavaScript file '{}' not found in '{}'.",
                self.config.entry_module,
                output_dir.display()
            ))),
        }
    }

    /// Run the runtime on `entry` and return its standard output.
    pub async fn execute(&self, entry: &Path, work_dir: &Path) -> Result<String> {
        let output = run_captured(
            Stage::Execute,
            self.toolchain.runtime_path(),
            entry,
            work_dir,
            self.config.timeout,
        )
        .await?;

        if !output.success() {
            return Err(Error::Execution(output.diagnostic_or(GENERIC_EXECUTION_MESSAGE)));
        }

        Ok(output.stdout)
    }
}

/// Position of the file's extension in [`MODULE_EXTENSIONS`].
fn module_rank(path: &Path) -> Option<usize> {
    let ext = path.extension()?.to_str()?;
    MODULE_EXTENSIONS.iter().position(|candidate| *candidate == ext)
}
