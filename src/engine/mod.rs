//! Remote engine contract so the session driver never depends on a concrete transport.
//!
//! The driver only ever sees three outcomes from the engine: text to print, a
//! prompt (engine suspended and ready), or the end of the session. Request
//! methods return an immediate textual echo; their completion is observed
//! solely through the next `Prompt`/`End` from [`DebugEngine::poll_event`].

pub mod protocol;
pub mod ws;

use std::io;

pub use ws::WsEngine;

/// One classified unit emitted by the remote engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// Terminal: no further events follow.
    End,
    /// Output to display verbatim; does not end the current wait.
    Text(String),
    /// The engine has suspended and is ready for the next operator command.
    Prompt,
}

/// Connection-level failures. All of them are fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The engine refused the connection.
    Refused,
    /// The connection was reset or closed underneath us.
    Closed,
    /// Anything else, carrying the underlying error text.
    Other(String),
}

impl TransportError {
    /// Classify an I/O error by kind so callers can report refused/closed/other.
    #[must_use]
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => Self::Closed,
            _ => Self::Other(err.to_string()),
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Refused => write!(f, "connection refused"),
            Self::Closed => write!(f, "connection closed"),
            Self::Other(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for TransportError {}

pub type EngineResult<T> = Result<T, TransportError>;

/// The remote debugging collaborator.
///
/// Breakpoint resolution, call stacks, scopes and evaluation all live on the
/// engine side; implementors forward requests and hand back whatever text the
/// engine produced for them.
pub trait DebugEngine {
    /// Block until the next event is available.
    fn poll_event(&mut self) -> EngineResult<ProtocolEvent>;

    /// Whether the engine has already announced the end of the session.
    /// Events sent before that announcement may still be queued for polling.
    fn has_ended(&self) -> bool {
        false
    }

    fn set_breakpoint(&mut self, location: &str) -> EngineResult<String>;
    fn list_breakpoints(&mut self) -> EngineResult<String>;
    fn delete_breakpoint(&mut self, selector: &str) -> EngineResult<String>;

    fn resume(&mut self) -> EngineResult<()>;
    fn step(&mut self) -> EngineResult<()>;
    fn next(&mut self) -> EngineResult<()>;
    fn finish(&mut self) -> EngineResult<()>;

    /// Source listing around `line_hint` (0 = current line), shifted by `offset`.
    fn source(&mut self, line_hint: u32, offset: i64) -> EngineResult<String>;
    fn evaluate(&mut self, expression: &str) -> EngineResult<()>;
    fn backtrace(&mut self, args: &str) -> EngineResult<String>;
    fn scope_chain(&mut self, args: &str) -> EngineResult<String>;
    fn scope_variables(&mut self, args: &str) -> EngineResult<String>;
    fn object(&mut self, index: &str) -> EngineResult<String>;

    /// Engine-side function table, for diagnostics.
    fn dump(&mut self) -> EngineResult<String>;
    /// Whether the engine should suspend when an exception is thrown.
    fn set_exception_stop(&mut self, enabled: bool) -> EngineResult<String>;

    /// Session-termination notice. Sent at most once by the driver.
    fn terminate(&mut self) -> EngineResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_io_classifies_refused_reset_and_other() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(TransportError::from_io(&refused), TransportError::Refused);

        for kind in [
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::BrokenPipe,
            io::ErrorKind::UnexpectedEof,
        ] {
            let err = io::Error::from(kind);
            assert_eq!(TransportError::from_io(&err), TransportError::Closed);
        }

        let other = io::Error::new(io::ErrorKind::PermissionDenied, "no route");
        assert_eq!(
            TransportError::from_io(&other),
            TransportError::Other("no route".to_string())
        );
    }
}
