//! Info command implementation for the Bosque kernel CLI.
//!
//! Prints the kernel metadata sent in `kernel_info_reply` and where the
//! compiler and runtime resolve on this machine.

use bosque_core::compile::{BridgeConfig, ToolchainManager};
use bosque_kernel::protocol::KernelInfo;

use crate::colors;

/// Print kernel metadata and toolchain status.
pub fn execute(config: &BridgeConfig) -> anyhow::Result<()> {
    let info = KernelInfo::default();
    println!("{}", serde_json::to_string_pretty(&info)?);

    println!("\n{}Toolchain{}", colors::BOLD, colors::RESET);
    println!("{}", "─".repeat(50));

    match ToolchainManager::new(config) {
        Ok(toolchain) => {
            println!(
                "{}  ◆ Compiler:{} {}",
                colors::CYAN,
                colors::RESET,
                toolchain.compiler_path().display()
            );
            println!(
                "{}  ◆ Runtime:{} {}",
                colors::CYAN,
                colors::RESET,
                toolchain.runtime_path().display()
            );
        }
        Err(e) => {
            println!("{}  ✗ {}{}", colors::RED, e.with_hint(), colors::RESET);
        }
    }

    match config.timeout {
        Some(timeout) => println!("{}  ◆ Timeout:{} {:?}", colors::CYAN, colors::RESET, timeout),
        None => println!("{}  ◆ Timeout: none{}", colors::DIM, colors::RESET),
    }

    Ok(())
}
