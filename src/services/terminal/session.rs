//! Terminal session: input line, history, transcript and the running command
//!
//! The session is owned by one thread. Commands run on a tokio runtime and
//! report back over a channel; [`TerminalSession::poll`] drains whatever has
//! arrived without blocking and folds it into the transcript.

use super::history::CommandHistory;
use super::process::{
    shell_invocation, spawn_shell_process, OutputStream, ProcessHandle, ProcessMessage,
};
use crate::config::TerminalConfig;
use std::path::PathBuf;
use std::sync::mpsc;
use tokio::runtime::Handle;

const HELP_LINES: &[&str] = &[
    "Available Commands:",
    "clear/cls - Clear terminal output",
    "echo [text] - Display text",
    "help - Show this help message",
    "Any other command will be executed in the system shell",
];

/// How a transcript chunk is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// The submitted command, as `> command`
    Echo,
    Stdout,
    Stderr,
    /// Messages from the session itself
    Info,
    /// The command could not be run
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptChunk {
    pub kind: ChunkKind,
    pub text: String,
}

impl TranscriptChunk {
    fn new(kind: ChunkKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running { command_id: u64 },
}

/// What `submit` did with a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input
    Ignored,
    /// Handled in-process
    Builtin,
    Spawned { command_id: u64 },
}

pub struct TerminalSession {
    config: TerminalConfig,
    runtime: Handle,
    working_dir: Option<PathBuf>,
    history: CommandHistory,
    input: String,
    transcript: Vec<TranscriptChunk>,
    state: SessionState,
    next_command_id: u64,
    process: Option<ProcessHandle>,
    last_exit_code: Option<i32>,
    sender: mpsc::Sender<ProcessMessage>,
    receiver: mpsc::Receiver<ProcessMessage>,
}

impl TerminalSession {
    /// Commands will be spawned on `runtime`
    pub fn new(config: TerminalConfig, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::channel();
        let mut session = Self {
            history: CommandHistory::new(config.history_capacity),
            config,
            runtime,
            working_dir: None,
            input: String::new(),
            transcript: Vec::new(),
            state: SessionState::Idle,
            next_command_id: 1,
            process: None,
            last_exit_code: None,
            sender,
            receiver,
        };
        if session.config.banner {
            session.push(ChunkKind::Info, "Terminal Ready");
            session.push(ChunkKind::Info, "Type 'help' for available commands");
            session.push(ChunkKind::Info, "-".repeat(37));
        }
        session
    }

    /// Run commands in `dir` instead of the current directory
    pub fn set_working_dir(&mut self, dir: impl Into<PathBuf>) {
        self.working_dir = Some(dir.into());
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running { .. })
    }

    pub fn last_exit_code(&self) -> Option<i32> {
        self.last_exit_code
    }

    pub fn transcript(&self) -> &[TranscriptChunk] {
        &self.transcript
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Submit whatever is in the input line
    pub fn submit_input(&mut self) -> SubmitOutcome {
        let input = std::mem::take(&mut self.input);
        self.submit(&input)
    }

    /// Run one command line.
    ///
    /// A command submitted while another is still running replaces it: the
    /// old child is killed and any output it already queued is dropped.
    pub fn submit(&mut self, command: &str) -> SubmitOutcome {
        let command = command.trim();
        if command.is_empty() {
            return SubmitOutcome::Ignored;
        }

        self.history.push(command);
        self.input.clear();
        self.push(ChunkKind::Echo, format!("> {command}"));

        match command {
            "clear" | "cls" => {
                self.clear();
                return SubmitOutcome::Builtin;
            }
            "help" => {
                for line in HELP_LINES {
                    self.push(ChunkKind::Info, *line);
                }
                return SubmitOutcome::Builtin;
            }
            _ => {}
        }
        if let Some(text) = command.strip_prefix("echo ") {
            self.push(ChunkKind::Info, text);
            return SubmitOutcome::Builtin;
        }

        if let Some(mut previous) = self.process.take() {
            tracing::debug!(command_id = previous.command_id(), "superseding running command");
            previous.cancel();
        }

        let command_id = self.next_command_id;
        self.next_command_id += 1;
        let invocation = shell_invocation(self.config.shell.as_deref(), command);
        tracing::debug!(command_id, program = %invocation.program, "spawning command");
        self.process = Some(spawn_shell_process(
            &self.runtime,
            command_id,
            invocation,
            self.working_dir.clone(),
            self.sender.clone(),
        ));
        self.state = SessionState::Running { command_id };
        SubmitOutcome::Spawned { command_id }
    }

    /// Show the previous history entry in the input line
    pub fn navigate_up(&mut self) {
        if let Some(entry) = self.history.navigate_up(&self.input) {
            self.input = entry.to_string();
        }
    }

    /// Show the next history entry, or the draft past the newest
    pub fn navigate_down(&mut self) {
        if let Some(entry) = self.history.navigate_down() {
            self.input = entry;
        }
    }

    /// Apply everything the running command has reported so far.
    ///
    /// Never blocks. Returns how many chunks were appended to the transcript.
    pub fn poll(&mut self) -> usize {
        let before = self.transcript.len();
        while let Ok(message) = self.receiver.try_recv() {
            let current = match self.state {
                SessionState::Running { command_id } => command_id,
                SessionState::Idle => continue,
            };
            if message.command_id() != current {
                continue;
            }
            match message {
                ProcessMessage::Output { stream, data, .. } => {
                    let kind = match stream {
                        OutputStream::Stdout => ChunkKind::Stdout,
                        OutputStream::Stderr => ChunkKind::Stderr,
                    };
                    self.push(kind, data);
                }
                ProcessMessage::SpawnFailed { error, .. } => {
                    self.push(ChunkKind::Error, format!("Failed to start command: {error}"));
                    self.finish(None);
                }
                ProcessMessage::Exited { exit_code, .. } => {
                    self.finish(Some(exit_code));
                }
            }
        }
        self.transcript.len().saturating_sub(before)
    }

    fn finish(&mut self, exit_code: Option<i32>) {
        self.state = SessionState::Idle;
        self.process = None;
        self.last_exit_code = exit_code;
    }

    fn push(&mut self, kind: ChunkKind, text: impl Into<String>) {
        self.transcript.push(TranscriptChunk::new(kind, text));
    }
}

impl std::fmt::Debug for TerminalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSession")
            .field("state", &self.state)
            .field("history", &self.history.len())
            .field("transcript", &self.transcript.len())
            .finish()
    }
}
