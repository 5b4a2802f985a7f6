//! Jupyter kernel spec installation.
//!
//! Jupyter discovers kernels through `kernels/<name>/kernel.json` under its
//! data directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, KernelResult};

/// Directory name of the installed kernel spec.
pub const KERNEL_NAME: &str = "bosque";

/// Contents of `kernel.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSpec {
    /// Command line Jupyter runs to start the kernel
    pub argv: Vec<String>,

    /// Display name
    pub display_name: String,

    /// Language
    pub language: String,
}

impl KernelSpec {
    /// Spec that launches `binary serve`.
    pub fn for_binary(binary: &Path) -> Self {
        Self {
            argv: vec![
                binary.to_string_lossy().into_owned(),
                "serve".to_string(),
                "--connection-file".to_string(),
                "{connection_file}".to_string(),
            ],
            display_name: "Bosque".to_string(),
            language: "bosque".to_string(),
        }
    }
}

/// The user-level Jupyter kernels directory.
pub fn default_kernels_dir() -> KernelResult<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|home| home.join("Library").join("Jupyter"))
    } else {
        dirs::data_dir().map(|data| data.join("jupyter"))
    };

    base.map(|dir| dir.join("kernels")).ok_or_else(|| {
        KernelError::KernelSpec("Could not determine the Jupyter data directory".to_string())
    })
}

/// Write `spec` to `<kernels_dir>/bosque/kernel.json`.
///
/// An existing spec of the same name is replaced. Returns the spec directory.
pub fn install(spec: &KernelSpec, kernels_dir: &Path) -> KernelResult<PathBuf> {
    let spec_dir = kernels_dir.join(KERNEL_NAME);

    if spec_dir.exists() {
        tracing::debug!("Replacing existing kernel spec at {}", spec_dir.display());
        fs::remove_dir_all(&spec_dir).map_err(|e| KernelError::Io {
            path: spec_dir.clone(),
            message: e.to_string(),
        })?;
    }

    fs::create_dir_all(&spec_dir).map_err(|e| KernelError::Io {
        path: spec_dir.clone(),
        message: e.to_string(),
    })?;

    let spec_file = spec_dir.join("kernel.json");
    let json = serde_json::to_string_pretty(spec)?;
    fs::write(&spec_file, json).map_err(|e| KernelError::Io {
        path: spec_file.clone(),
        message: e.to_string(),
    })?;

    tracing::info!("Installed kernel spec to {}", spec_dir.display());
    Ok(spec_dir)
}
