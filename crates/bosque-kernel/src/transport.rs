//! JSON-lines transport.
//!
//! Each input line holds one [`RequestEnvelope`]. While a request is being
//! served, the broadcast messages it produces are written as they arrive;
//! the reply follows them. Every message is one [`OutgoingEnvelope`] line.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::error::{KernelError, KernelResult};
use crate::protocol::{IopubMessage, Outgoing, OutgoingEnvelope, Reply, Request, RequestEnvelope};
use crate::session::KernelSession;

/// Serve requests from `reader` until shutdown or end of input.
///
/// The session is shut down on return in both cases.
pub async fn serve<R, W>(
    session: &mut KernelSession,
    mut rx: broadcast::Receiver<IopubMessage>,
    reader: R,
    mut writer: W,
) -> KernelResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let envelope: RequestEnvelope = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Malformed request: {}", e);
                let reply = Reply::ProtocolError {
                    message: format!("Malformed request: {e}"),
                };
                write_message(&mut writer, Outgoing::Shell(reply), None).await?;
                writer.flush().await?;
                continue;
            }
        };

        let parent = envelope.msg_id;
        let shutting_down = matches!(envelope.request, Request::ShutdownRequest { .. });

        let handled =
            forward_while(session.handle(envelope.request), &mut rx, &mut writer, &parent).await?;

        let reply = match handled {
            Ok(reply) => reply,
            Err(e @ (KernelError::Core(_) | KernelError::SessionTerminated)) => {
                tracing::error!("Request failed: {}", e);
                Reply::ProtocolError {
                    message: e.to_string(),
                }
            }
            Err(e) => return Err(e),
        };

        drain_iopub(&mut rx, &mut writer, &parent).await?;
        write_message(&mut writer, Outgoing::Shell(reply), parent).await?;
        writer.flush().await?;

        if shutting_down {
            tracing::info!("Shutdown requested, leaving serve loop");
            return Ok(());
        }
    }

    tracing::debug!("Input closed, shutting down session");
    session.shutdown();
    Ok(())
}

/// Drive `request` to completion, writing broadcasts while it runs.
async fn forward_while<F, W>(
    request: F,
    rx: &mut broadcast::Receiver<IopubMessage>,
    writer: &mut W,
    parent: &Option<String>,
) -> KernelResult<F::Output>
where
    F: Future,
    W: AsyncWrite + Unpin,
{
    tokio::pin!(request);

    loop {
        tokio::select! {
            biased;

            output = &mut request => return Ok(output),

            message = rx.recv() => match message {
                Ok(message) => {
                    write_message(writer, Outgoing::Iopub(message), parent.clone()).await?;
                    writer.flush().await?;
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("Dropped {} broadcast messages", n);
                }
                Err(RecvError::Closed) => return Ok(request.await),
            },
        }
    }
}

async fn drain_iopub<W>(
    rx: &mut broadcast::Receiver<IopubMessage>,
    writer: &mut W,
    parent: &Option<String>,
) -> KernelResult<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        match rx.try_recv() {
            Ok(message) => {
                write_message(writer, Outgoing::Iopub(message), parent.clone()).await?;
            }
            Err(TryRecvError::Lagged(n)) => {
                tracing::warn!("Dropped {} broadcast messages", n);
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

async fn write_message<W>(
    writer: &mut W,
    message: Outgoing,
    parent: Option<String>,
) -> KernelResult<()>
where
    W: AsyncWrite + Unpin,
{
    let envelope = OutgoingEnvelope::new(message, parent);
    let mut line = serde_json::to_vec(&envelope)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bosque_core::compile::{Bridge, BridgeConfig, ToolchainManager};
    use bosque_core::paths::ScratchWorkspace;
    use serde_json::Value;

    fn session() -> (KernelSession, broadcast::Receiver<IopubMessage>) {
        let bridge = Bridge::with_toolchain(
            BridgeConfig::default(),
            ToolchainManager::from_paths("bosque", "node"),
        );
        KernelSession::with_parts(bridge, ScratchWorkspace::create().unwrap())
    }

    async fn run(input: &str) -> (Vec<Value>, KernelSession) {
        let (mut session, rx) = session();
        let mut output = Vec::new();
        serve(&mut session, rx, input.as_bytes(), &mut output)
            .await
            .unwrap();

        let lines = String::from_utf8(output).unwrap();
        let messages = lines
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (messages, session)
    }

    #[tokio::test]
    async fn test_malformed_line_gets_protocol_error() {
        let (messages, _session) = run("not json\n\n").await;

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["channel"], "shell");
        assert_eq!(messages[0]["msg_type"], "protocol_error");
    }

    #[tokio::test]
    async fn test_kernel_info_echoes_parent_id() {
        let (messages, _session) =
            run("{\"msg_id\":\"abc\",\"msg_type\":\"kernel_info_request\"}\n").await;

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["parent_msg_id"], "abc");
        assert_eq!(messages[0]["msg_type"], "kernel_info_reply");
        assert_eq!(messages[0]["implementation"], "BosqueKernel");
    }

    #[tokio::test]
    async fn test_shutdown_stops_reading() {
        let input = concat!(
            "{\"msg_type\":\"shutdown_request\",\"restart\":true}\n",
            "{\"msg_type\":\"kernel_info_request\"}\n",
        );
        let (messages, session) = run(input).await;

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["msg_type"], "shutdown_reply");
        assert_eq!(messages[0]["restart"], true);
        assert!(session.scratch_path().is_none());
    }

    #[tokio::test]
    async fn test_end_of_input_shuts_down() {
        let (messages, session) = run("").await;
        assert!(messages.is_empty());
        assert!(session.scratch_path().is_none());
    }
}
