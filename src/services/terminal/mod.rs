//! Embedded shell terminal

pub mod history;
pub mod process;
pub mod session;

pub use session::{ChunkKind, SessionState, SubmitOutcome, TerminalSession, TranscriptChunk};
