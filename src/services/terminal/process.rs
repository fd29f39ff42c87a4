//! Shell command execution for the terminal session
//!
//! Each command runs as its own child process on the tokio runtime. Output is
//! forwarded chunk by chunk over a `std::sync::mpsc` channel as it arrives, so
//! the owner can drain it from a synchronous loop without blocking.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::mpsc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

const READ_CHUNK: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Messages sent from a running command back to its session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessMessage {
    Output {
        command_id: u64,
        stream: OutputStream,
        data: String,
    },
    /// The shell could not be started at all
    SpawnFailed { command_id: u64, error: String },
    Exited { command_id: u64, exit_code: i32 },
}

impl ProcessMessage {
    pub fn command_id(&self) -> u64 {
        match self {
            Self::Output { command_id, .. }
            | Self::SpawnFailed { command_id, .. }
            | Self::Exited { command_id, .. } => *command_id,
        }
    }
}

/// Program and arguments that run one command line through a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellInvocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Wrap `command` for the platform shell, or for `shell_override` if given.
///
/// `cmd`-style shells take `/c`; everything else takes `-c`.
pub fn shell_invocation(shell_override: Option<&str>, command: &str) -> ShellInvocation {
    let program = match shell_override {
        Some(shell) => shell.to_string(),
        None if cfg!(windows) => "cmd.exe".to_string(),
        None => "/bin/sh".to_string(),
    };
    let flag = if is_cmd_shell(&program) { "/c" } else { "-c" };
    ShellInvocation {
        program,
        args: vec![flag.to_string(), command.to_string()],
    }
}

/// Whether `program` names `cmd` or `cmd.exe`, with either path separator
fn is_cmd_shell(program: &str) -> bool {
    let name = program.rsplit(['/', '\\']).next().unwrap_or(program);
    name.eq_ignore_ascii_case("cmd") || name.eq_ignore_ascii_case("cmd.exe")
}

/// A command started with [`spawn_shell_process`].
///
/// Dropping the handle kills the child if it is still running.
#[derive(Debug)]
pub struct ProcessHandle {
    command_id: u64,
    cancel: Option<oneshot::Sender<()>>,
}

impl ProcessHandle {
    pub fn command_id(&self) -> u64 {
        self.command_id
    }

    /// Ask the child to be killed. Its remaining output is discarded.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

/// Start `invocation` on `runtime`, reporting through `sender`
pub fn spawn_shell_process(
    runtime: &Handle,
    command_id: u64,
    invocation: ShellInvocation,
    cwd: Option<PathBuf>,
    sender: mpsc::Sender<ProcessMessage>,
) -> ProcessHandle {
    let (cancel_tx, cancel_rx) = oneshot::channel();
    // Detached: the task ends on its own once the child exits or is cancelled
    runtime.spawn(run_shell_process(
        command_id, invocation, cwd, sender, cancel_rx,
    ));
    ProcessHandle {
        command_id,
        cancel: Some(cancel_tx),
    }
}

/// Run one command to completion or until `cancel` fires (or its sender is
/// dropped).
///
/// Sends any number of `Output` messages followed by exactly one `Exited` or
/// `SpawnFailed`. A cancelled command sends nothing further.
pub async fn run_shell_process(
    command_id: u64,
    invocation: ShellInvocation,
    cwd: Option<PathBuf>,
    sender: mpsc::Sender<ProcessMessage>,
    mut cancel: oneshot::Receiver<()>,
) {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    if let Some(ref dir) = cwd {
        cmd.current_dir(dir);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(command_id, program = %invocation.program, "spawn failed: {e}");
            let _ = sender.send(ProcessMessage::SpawnFailed {
                command_id,
                error: format!("{}: {}", invocation.program, e),
            });
            return;
        }
    };
    tracing::debug!(command_id, pid = ?child.id(), "command started");

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_sender = sender.clone();
    let stderr_sender = sender.clone();

    let outcome = tokio::select! {
        status = async {
            tokio::join!(
                pump(stdout, OutputStream::Stdout, command_id, stdout_sender),
                pump(stderr, OutputStream::Stderr, command_id, stderr_sender),
            );
            child.wait().await
        } => Some(status),
        _ = &mut cancel => None,
    };

    match outcome {
        Some(status) => {
            let exit_code = match status {
                Ok(status) => status.code().unwrap_or(-1),
                Err(_) => -1,
            };
            tracing::debug!(command_id, exit_code, "command exited");
            let _ = sender.send(ProcessMessage::Exited {
                command_id,
                exit_code,
            });
        }
        None => {
            tracing::debug!(command_id, "command cancelled");
            let _ = child.kill().await;
        }
    }
}

/// Forward everything read from `reader` until EOF
async fn pump<R>(
    reader: Option<R>,
    stream: OutputStream,
    command_id: u64,
    sender: mpsc::Sender<ProcessMessage>,
) where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return;
    };
    let mut buf = vec![0u8; READ_CHUNK];
    let mut pending = Vec::new();
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(command_id, ?stream, "read error: {e}");
                break;
            }
        };
        pending.extend_from_slice(&buf[..n]);
        let data = take_decoded(&mut pending);
        if !data.is_empty() {
            let message = ProcessMessage::Output {
                command_id,
                stream,
                data,
            };
            if sender.send(message).is_err() {
                return;
            }
        }
    }
    if !pending.is_empty() {
        let _ = sender.send(ProcessMessage::Output {
            command_id,
            stream,
            data: String::from_utf8_lossy(&pending).into_owned(),
        });
    }
}

/// Decode the complete part of `pending`, leaving a split multi-byte
/// sequence at the end for the next read. Invalid bytes become U+FFFD.
fn take_decoded(pending: &mut Vec<u8>) -> String {
    let complete = match std::str::from_utf8(pending) {
        Ok(_) => pending.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => pending.len(),
    };
    let rest = pending.split_off(complete);
    let text = String::from_utf8_lossy(pending).into_owned();
    *pending = rest;
    text
}
