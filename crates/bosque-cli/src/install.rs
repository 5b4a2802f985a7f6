//! Install command implementation for the Bosque kernel CLI.

use std::path::PathBuf;

use bosque_kernel::{KernelSpec, default_kernels_dir, install};

use crate::colors;

/// Install the kernel spec pointing at the running binary.
pub fn execute(dir: Option<PathBuf>) -> anyhow::Result<()> {
    let kernels_dir = match dir {
        Some(dir) => dir,
        None => default_kernels_dir()?,
    };

    let binary = std::env::current_exe()?;
    let spec = KernelSpec::for_binary(&binary);
    let spec_dir = install(&spec, &kernels_dir)?;

    println!(
        "{}Installed{} kernel spec '{}' to {}",
        colors::GREEN,
        colors::RESET,
        spec.display_name,
        spec_dir.display()
    );

    Ok(())
}
