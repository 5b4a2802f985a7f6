//! Child process invocation with captured output.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

use crate::error::{Error, Result};

use super::types::{ProcessOutput, Stage};

/// Build the error variant belonging to `stage`.
pub(crate) fn stage_error(stage: Stage, message: String) -> Error {
    match stage {
        Stage::Compile => Error::Compilation(message),
        Stage::Execute => Error::Execution(message),
    }
}

/// Run `program arg` inside `work_dir` and capture its output.
///
/// The working directory is set on the child only; the kernel's own
/// current directory is never touched. When `timeout` elapses the child
/// is killed and the stage error reports the timeout.
pub(crate) async fn run_captured(
    stage: Stage,
    program: &Path,
    arg: &Path,
    work_dir: &Path,
    timeout: Option<Duration>,
) -> Result<ProcessOutput> {
    let start = Instant::now();

    let mut command = Command::new(program);
    command
        .arg(arg)
        .current_dir(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(
        "[{}] running {} {} in {}",
        stage.as_str(),
        program.display(),
        arg.display(),
        work_dir.display()
    );

    let pending = command.output();
    let output = match timeout {
        // Dropping the future on expiry kills the child (kill_on_drop)
        Some(limit) => match tokio::time::timeout(limit, pending).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("[{}] {} timed out after {:?}", stage.as_str(), program.display(), limit);
                return Err(stage_error(
                    stage,
                    format!("{} timed out after {}s", program.display(), limit.as_secs_f64()),
                ));
            }
        },
        None => pending.await,
    }
    .map_err(|e| stage_error(stage, format!("failed to run {}: {}", program.display(), e)))?;

    let captured = ProcessOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    tracing::debug!(
        "[{}] exited with {:?} in {}ms",
        stage.as_str(),
        captured.code,
        start.elapsed().as_millis()
    );

    Ok(captured)
}
