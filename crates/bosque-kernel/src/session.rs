//! Kernel session management.
//!
//! A session owns one scratch workspace and one bridge, and serves
//! requests strictly one at a time:
//!
//! ```text
//! Idle ──execute──► Busy ──done──► Idle
//!  │
//!  └──shutdown──► ShuttingDown ──► Terminated
//! ```

use std::path::Path;

use tokio::sync::broadcast;

use bosque_core::compile::{Bridge, BridgeConfig};
use bosque_core::highlight::{Token, tokenize};
use bosque_core::paths::ScratchWorkspace;

use crate::error::{KernelError, KernelResult};
use crate::protocol::{
    ErrorContent, ExecuteReply, ExecutionState, IopubMessage, KernelInfo, Reply, Request,
    StreamName,
};

/// Capacity for the broadcast channel.
/// One execution emits at most four messages; the transport forwards them
/// while the request is still running.
const MESSAGE_CHANNEL_CAPACITY: usize = 64;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for the next request.
    Idle,
    /// Compiling or running a cell.
    Busy,
    /// Tearing down the scratch workspace.
    ShuttingDown,
    /// No further requests are served.
    Terminated,
}

/// A kernel session.
pub struct KernelSession {
    /// Compiler/runtime bridge.
    bridge: Bridge,

    /// Scratch workspace, `None` once shut down.
    scratch: Option<ScratchWorkspace>,

    /// Current lifecycle state.
    state: SessionState,

    /// Number of counted executions so far.
    execution_count: u32,

    /// Broadcast channel for IOPub messages.
    tx: broadcast::Sender<IopubMessage>,
}

impl KernelSession {
    /// Start a session: resolve the toolchain and create the scratch workspace.
    ///
    /// # Errors
    /// Fails with an environment error if either executable is missing or
    /// the scratch directory cannot be created. No session exists then.
    pub fn new(config: BridgeConfig) -> KernelResult<(Self, broadcast::Receiver<IopubMessage>)> {
        let bridge = Bridge::new(config).inspect_err(|e| {
            tracing::error!("Failed to initialize kernel session: {}", e);
        })?;
        let scratch = ScratchWorkspace::create()?;
        Ok(Self::with_parts(bridge, scratch))
    }

    /// Start a session from an existing bridge and workspace.
    pub fn with_parts(
        bridge: Bridge,
        scratch: ScratchWorkspace,
    ) -> (Self, broadcast::Receiver<IopubMessage>) {
        let (tx, rx) = broadcast::channel(MESSAGE_CHANNEL_CAPACITY);

        tracing::info!(
            "Kernel session started (compiler: {}, runtime: {}, scratch: {})",
            bridge.toolchain().compiler_path().display(),
            bridge.toolchain().runtime_path().display(),
            scratch.path().display()
        );

        let session = Self {
            bridge,
            scratch: Some(scratch),
            state: SessionState::Idle,
            execution_count: 0,
            tx,
        };
        (session, rx)
    }

    /// Subscribe to IOPub messages.
    pub fn subscribe(&self) -> broadcast::Receiver<IopubMessage> {
        self.tx.subscribe()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of counted executions so far.
    pub fn execution_count(&self) -> u32 {
        self.execution_count
    }

    /// Scratch directory, `None` after shutdown.
    pub fn scratch_path(&self) -> Option<&Path> {
        self.scratch.as_ref().map(|s| s.path())
    }

    /// Serve one request.
    pub async fn handle(&mut self, request: Request) -> KernelResult<Reply> {
        match request {
            Request::ExecuteRequest {
                code,
                silent,
                store_history,
            } => {
                let reply = self.execute(&code, silent, store_history).await?;
                Ok(Reply::ExecuteReply(reply))
            }
            Request::KernelInfoRequest => {
                self.ensure_running()?;
                Ok(Reply::KernelInfoReply(self.kernel_info()))
            }
            Request::HighlightRequest { code } => {
                self.ensure_running()?;
                Ok(Reply::HighlightReply {
                    tokens: self.highlight(&code),
                })
            }
            Request::ShutdownRequest { restart } => {
                self.shutdown();
                Ok(Reply::ShutdownReply { restart })
            }
        }
    }

    /// Compile and run one cell.
    ///
    /// Compilation and execution failures are reported in the reply and
    /// leave the session usable. Unless `silent`, the busy/idle status,
    /// the captured output or the error are broadcast as well. The
    /// execution counter only advances for non-silent requests that set
    /// `store_history`.
    pub async fn execute(
        &mut self,
        code: &str,
        silent: bool,
        store_history: bool,
    ) -> KernelResult<ExecuteReply> {
        let work_dir = match (&self.scratch, self.state) {
            (Some(scratch), SessionState::Idle) => scratch.path().to_path_buf(),
            _ => return Err(KernelError::SessionTerminated),
        };

        if !silent {
            self.broadcast(IopubMessage::Status {
                execution_state: ExecutionState::Busy,
            });
            tracing::debug!("Kernel is busy executing code.");
        }

        if store_history && !silent {
            self.execution_count += 1;
        }

        self.state = SessionState::Busy;
        let result = self.bridge.compile_and_execute(code, &work_dir).await;
        self.state = SessionState::Idle;

        let reply = match result {
            Ok(output) => {
                tracing::debug!("Code compiled and executed successfully.");
                if !silent {
                    self.broadcast(IopubMessage::Stream {
                        name: StreamName::Stdout,
                        text: output,
                    });
                }
                ExecuteReply::ok(self.execution_count)
            }
            Err(e) => {
                tracing::error!("{}: {}", e.kind(), e);
                let content = ErrorContent::from_error(&e);
                if !silent {
                    self.broadcast(IopubMessage::Error(content.clone()));
                }
                ExecuteReply::error(self.execution_count, content)
            }
        };

        if !silent {
            self.broadcast(IopubMessage::Status {
                execution_state: ExecutionState::Idle,
            });
            tracing::debug!("Kernel status set to idle.");
        }

        Ok(reply)
    }

    /// Kernel and language metadata.
    pub fn kernel_info(&self) -> KernelInfo {
        KernelInfo::default()
    }

    /// Tokenize `code` for highlighting.
    pub fn highlight(&self, code: &str) -> Vec<Token> {
        tokenize(code).collect()
    }

    /// Remove the scratch workspace and stop serving requests.
    ///
    /// Removal failures are logged and ignored. Calling this twice is a no-op.
    pub fn shutdown(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }

        self.state = SessionState::ShuttingDown;
        if let Some(scratch) = self.scratch.take() {
            scratch.remove();
        }
        self.state = SessionState::Terminated;
        tracing::info!("Kernel session terminated");
    }

    fn ensure_running(&self) -> KernelResult<()> {
        match self.state {
            SessionState::ShuttingDown | SessionState::Terminated => {
                Err(KernelError::SessionTerminated)
            }
            SessionState::Idle | SessionState::Busy => Ok(()),
        }
    }

    fn broadcast(&self, message: IopubMessage) {
        // No subscribers is fine: nobody is listening for output
        let _ = self.tx.send(message);
    }
}
