//! Debugging session: driver loop, command interpreter, and nested drains.
//!
//! One thread of control alternates between polling engine events and reading
//! operator commands. The interpreter only runs after a `Prompt`, and every
//! multi-step command drains the engine back to a `Prompt` before issuing its
//! next request, so local bookkeeping never runs ahead of the engine.

pub mod commands;
mod driver;
mod input;
mod repeat;
mod scroll;
mod state;
#[cfg(test)]
pub(crate) mod test_support;

use std::io;
use std::time::Duration;

use crate::engine::TransportError;

pub use commands::{parse_line, Command, CommandInterpreter, ParsedLine};
pub use driver::SessionDriver;
pub use input::{KeySource, LineSource, StdinLines, TerminalKeys, PROMPT};
pub use repeat::{drain_to_prompt, repeat_step, DrainOutcome, StepKind};
pub use scroll::{run_scroll, ScrollKey, ScrollState};
pub use state::SessionState;

/// How a session finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Operator typed `quit`.
    Quit,
    /// Operator input ended without `quit`.
    EndOfInput,
    /// The engine ended the session.
    RemoteClosed,
    /// The connection failed underneath the session.
    Transport(TransportError),
}

/// Failures inside a command cycle.
#[derive(Debug)]
pub enum SessionError {
    /// Engine connection failed; fatal to the session.
    Transport(TransportError),
    /// Operator terminal could not be read or written.
    Io(io::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "engine transport failed: {err}"),
            Self::Io(err) => write!(f, "terminal i/o failed: {err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Whether the interpreter keeps the prompt after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptFlow {
    KeepPrompting,
    ReturnToDriver,
}

/// Everything a command handler may touch during one command.
pub struct CommandContext<'a, E, K, W> {
    pub engine: &'a mut E,
    pub keys: &'a mut K,
    pub out: &'a mut W,
    pub state: &'a mut SessionState,
    pub step_delay: Duration,
}
