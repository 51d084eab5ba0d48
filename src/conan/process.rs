//! Async subprocess invocation
//!
//! A thin wrapper over [`tokio::process::Command`] that captures stdout,
//! stderr and the exit status. Only the calling task suspends while the
//! child runs, so any number of invocations can be in flight at once. The
//! runner itself never raises a domain error for a non-zero exit; the
//! command layer above decides how to surface it. There are no timeout or
//! cancellation semantics; a hung child hangs the invoking task.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::debug;

/// Captured output of a finished subprocess.
#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status: ExitStatus,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Stdout decoded as text (lossily).
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Stderr decoded as text (lossily), byte-for-byte otherwise.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Run `program` with `args`, waiting for the process to exit and both
/// standard streams to drain.
pub async fn run<I, S>(
    program: impl AsRef<OsStr>,
    args: I,
    cwd: Option<&Path>,
) -> std::io::Result<ProcessOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    debug!(program = %program.to_string_lossy(), "spawning subprocess");
    let output = command.spawn()?.wait_with_output().await?;
    debug!(
        program = %program.to_string_lossy(),
        code = ?output.status.code(),
        "subprocess finished"
    );

    Ok(ProcessOutput {
        stdout: output.stdout,
        stderr: output.stderr,
        status: output.status,
    })
}
