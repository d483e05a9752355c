//! Typed JSON frames exchanged with the engine's debugger endpoint.
//!
//! Every WebSocket text frame carries exactly one JSON object. Requests are
//! tagged by `"cmd"` and carry a numeric `id`; engine messages are tagged by
//! `"event"`. Replies echo the request `id` they answer.

use serde::{Deserialize, Serialize};

// ============================================================================
// Requests (client → engine)
// ============================================================================

/// Requests the front end sends to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum EngineRequest {
    /// Insert a breakpoint at a line number or function name.
    #[serde(rename = "set_breakpoint")]
    SetBreakpoint { location: String },

    /// Render the current breakpoint set (active and pending).
    #[serde(rename = "list_breakpoints")]
    ListBreakpoints,

    /// Remove breakpoints by id or by `all`/`active`/`pending`.
    #[serde(rename = "delete_breakpoint")]
    DeleteBreakpoint { selector: String },

    #[serde(rename = "resume")]
    Resume,

    #[serde(rename = "step")]
    Step,

    #[serde(rename = "next")]
    Next,

    /// Run until the current function returns.
    #[serde(rename = "finish")]
    Finish,

    /// Source listing around `line` (0 = current), shifted by `offset` lines.
    #[serde(rename = "source")]
    Source { line: u32, offset: i64 },

    #[serde(rename = "evaluate")]
    Evaluate { expression: String },

    #[serde(rename = "backtrace")]
    Backtrace { args: String },

    #[serde(rename = "scope_chain")]
    ScopeChain { args: String },

    #[serde(rename = "scope_variables")]
    ScopeVariables { args: String },

    #[serde(rename = "object")]
    Object { index: String },

    #[serde(rename = "dump")]
    Dump,

    /// Toggle suspension on thrown exceptions.
    #[serde(rename = "exception_stop")]
    ExceptionStop { enabled: bool },

    /// Script source uploaded by the client before execution starts.
    #[serde(rename = "client_source")]
    ClientSource { name: String, source: String },

    #[serde(rename = "terminate")]
    Terminate,
}

impl EngineRequest {
    /// Whether the engine leaves its suspended state after this request.
    #[must_use]
    pub fn resumes_execution(&self) -> bool {
        matches!(
            self,
            Self::Resume | Self::Step | Self::Next | Self::Finish | Self::Evaluate { .. }
        )
    }

    /// Whether the engine answers this request with a `reply` frame.
    #[must_use]
    pub fn expects_reply(&self) -> bool {
        matches!(
            self,
            Self::SetBreakpoint { .. }
                | Self::ListBreakpoints
                | Self::DeleteBreakpoint { .. }
                | Self::Source { .. }
                | Self::Backtrace { .. }
                | Self::ScopeChain { .. }
                | Self::ScopeVariables { .. }
                | Self::Object { .. }
                | Self::Dump
                | Self::ExceptionStop { .. }
        )
    }
}

/// Wire envelope pairing a request with its correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFrame {
    pub id: u64,
    #[serde(flatten)]
    pub request: EngineRequest,
}

// ============================================================================
// Engine messages (engine → client)
// ============================================================================

/// Messages the engine sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum EngineMessage {
    /// Console output, trace lines, evaluation results.
    #[serde(rename = "output")]
    Output {
        /// Text printed verbatim, including its own line endings.
        text: String,
    },

    /// Engine suspended and waiting for a command.
    #[serde(rename = "prompt")]
    Prompt,

    /// Answer to a request that expects one.
    #[serde(rename = "reply")]
    Reply {
        /// Id of the request being answered.
        id: u64,
        /// Text shown to the operator.
        text: String,
    },

    /// The debuggee finished and the engine is closing the session.
    #[serde(rename = "closed")]
    Closed,
}
