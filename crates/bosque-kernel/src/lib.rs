//! Bosque notebook kernel.
//!
//! Serves notebook requests over a JSON-lines transport.
//!
//! # Architecture
//!
//! The kernel consists of:
//! - **Session**: Owns the scratch workspace and runs cells through the bridge
//! - **Protocol**: Defines request, reply and broadcast message types
//! - **Transport**: Reads requests and writes messages, one JSON object per line
//! - **Kernel spec**: Registers the kernel with Jupyter

pub mod error;
pub mod kernelspec;
pub mod protocol;
pub mod session;
pub mod transport;

use bosque_core::compile::BridgeConfig;
use tokio::io::BufReader;

pub use error::{KernelError, KernelResult};
pub use kernelspec::{KernelSpec, default_kernels_dir, install};
pub use protocol::{IopubMessage, Reply, Request};
pub use session::{KernelSession, SessionState};
pub use transport::serve;

/// Start a session and serve it over stdin/stdout until shutdown.
pub async fn serve_stdio(config: BridgeConfig) -> KernelResult<()> {
    let (mut session, rx) = KernelSession::new(config)?;

    tracing::info!("Bosque kernel ready, reading requests from stdin");

    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();

    let result = serve(&mut session, rx, reader, writer).await;

    // Transport errors still leave no scratch directory behind
    session.shutdown();
    result
}
