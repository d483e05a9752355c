//! Process exit reporting for finished or failed sessions.

use crate::engine::TransportError;
use crate::session::SessionEnd;

/// Final message for stderr plus the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReport {
    pub message: String,
    pub code: i32,
}

impl ExitReport {
    fn new(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Report for a session that ran to completion.
#[must_use]
pub fn session_report(end: &SessionEnd) -> ExitReport {
    match end {
        SessionEnd::Quit | SessionEnd::EndOfInput => ExitReport::new("Connection closed.", 0),
        SessionEnd::RemoteClosed => ExitReport::new("Connection closed by the engine.", 0),
        SessionEnd::Transport(err) => transport_report(err),
    }
}

/// Report for a transport failure, during connect or mid-session.
#[must_use]
pub fn transport_report(err: &TransportError) -> ExitReport {
    match err {
        TransportError::Refused => {
            ExitReport::new("Failed to connect to the Escargot debugger.", 1)
        }
        TransportError::Closed => ExitReport::new("Connection closed.", 1),
        TransportError::Other(msg) => ExitReport::new(
            format!("Failed to connect to the Escargot debugger.\nError: {msg}"),
            1,
        ),
    }
}
