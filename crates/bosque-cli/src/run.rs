//! Run command implementation for the Bosque kernel CLI.
//!
//! Compiles and runs a single source file in a throwaway workspace, the
//! same way the kernel runs a notebook cell.

use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use bosque_core::compile::{Bridge, BridgeConfig};
use bosque_core::paths::ScratchWorkspace;

use crate::colors;

/// Compile and run a source file, printing its output.
pub async fn execute(source_path: &str, config: BridgeConfig) -> anyhow::Result<()> {
    let path = Path::new(source_path);
    if !path.exists() {
        anyhow::bail!("Source file not found: {}", source_path);
    }

    let start = Instant::now();
    let source = tokio::fs::read_to_string(path).await?;

    let bridge = Bridge::new(config)?;
    let scratch = ScratchWorkspace::create()?;

    let result = bridge.compile_and_execute(&source, scratch.path()).await;
    scratch.remove();

    let output = result?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    eprintln!(
        "{}Completed{} {} in {:.2}s",
        colors::GREEN,
        colors::RESET,
        path.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
