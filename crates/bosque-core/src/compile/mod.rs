//! Compilation pipeline for Bosque cells.
//!
//! This module provides:
//! - Toolchain resolution (compiler and JavaScript runtime on PATH)
//! - The compile-and-run bridge
//! - Child process capture with optional timeouts
//!
//! # Architecture
//!
//! ```text
//! Cell source
//!     │
//!     ├── ToolchainManager ──► bosque, node
//!     │
//!     └── Bridge::compile ──► jsout/ ──► find_entry_module ──► Bridge::execute ──► stdout
//! ```

mod bridge;
mod command;
mod toolchain;
mod types;

pub use bridge::Bridge;
pub use toolchain::ToolchainManager;
pub use types::{BridgeConfig, ProcessOutput, Stage, COMPILER_ENV, RUNTIME_ENV, TIMEOUT_ENV};
