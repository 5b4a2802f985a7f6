//! Serve command implementation for the Bosque kernel CLI.
//!
//! Runs one kernel session over stdin/stdout until shutdown.

use std::path::Path;

use bosque_core::compile::BridgeConfig;

/// Exit status after Ctrl+C, as shells report SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Serve notebook requests until shutdown, end of input or Ctrl+C.
pub async fn execute(connection_file: Option<&Path>, config: BridgeConfig) -> anyhow::Result<()> {
    if let Some(path) = connection_file {
        tracing::info!(
            "Connection file {} ignored, serving JSON lines on stdio",
            path.display()
        );
    }

    let interrupted = tokio::select! {
        result = bosque_kernel::serve_stdio(config) => {
            result?;
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };

    // The serve future, and with it the session and its scratch
    // directory, is dropped once select! returns.
    if interrupted {
        tracing::info!("Interrupted, kernel stopped");
        // A blocked stdin read would keep the runtime from shutting down
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }

    Ok(())
}
