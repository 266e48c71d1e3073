use super::output::ProcessOutput;
use super::{Action, BridgeConfig, BridgeError};
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

/// Hide the console window PowerShell would otherwise open
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Spawn the interpreter once and collect everything it produces.
///
/// The child is killed if this future is dropped before the process exits,
/// which is how callers abandon a run.
pub(super) async fn run(
    config: &BridgeConfig,
    action: Action,
    args: &[String],
) -> Result<ProcessOutput, BridgeError> {
    let mut command = Command::new(&config.interpreter);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);

    let started = Instant::now();
    let mut child = command.spawn().map_err(|source| BridgeError::Spawn {
        interpreter: config.interpreter.clone(),
        source,
    })?;
    let pid = child.id();
    tracing::debug!(action = %action, pid = ?pid, "script process started");

    let result = match config.timeout {
        Some(limit) => match tokio::time::timeout(limit, capture(&mut child)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    action = %action,
                    pid = ?pid,
                    timeout_secs = limit.as_secs(),
                    "script run timed out; killing process"
                );
                // Reap the child so it does not linger as a zombie
                let _ = child.kill().await;
                return Err(BridgeError::Timeout(limit));
            }
        },
        None => capture(&mut child).await,
    };

    let (status, stdout, stderr) = result?;
    tracing::debug!(
        action = %action,
        pid = ?pid,
        exit_code = ?status.code(),
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "script process finished"
    );

    Ok(ProcessOutput {
        code: status.code(),
        stdout,
        stderr,
    })
}

/// Drain both output pipes while waiting for the exit status
async fn capture(child: &mut Child) -> Result<(ExitStatus, Vec<u8>, Vec<u8>), BridgeError> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (status, stdout, stderr) =
        tokio::join!(child.wait(), drain(stdout), drain(stderr));

    Ok((status?, stdout?, stderr?))
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}
