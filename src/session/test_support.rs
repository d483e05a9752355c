use std::collections::VecDeque;
use std::io;

use super::input::{KeySource, LineSource};
use crate::engine::{DebugEngine, EngineResult, ProtocolEvent, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EngineCall {
    Poll,
    SetBreakpoint(String),
    ListBreakpoints,
    DeleteBreakpoint(String),
    Resume,
    Step,
    Next,
    Finish,
    Source(u32, i64),
    Evaluate(String),
    Backtrace(String),
    ScopeChain(String),
    ScopeVariables(String),
    Object(String),
    Dump,
    ExceptionStop(bool),
    Terminate,
}

impl EngineCall {
    /// Every call except polling counts as a request to the engine.
    pub(crate) fn is_request(&self) -> bool {
        !matches!(self, Self::Poll)
    }
}

/// Scripted engine: hands out queued events, then `End` forever.
#[derive(Debug, Default)]
pub(crate) struct FakeEngine {
    events: VecDeque<EngineResult<ProtocolEvent>>,
    breakpoints: Vec<String>,
    pub(crate) calls: Vec<EngineCall>,
    /// Reported through `has_ended`.
    pub(crate) ended: bool,
}

impl FakeEngine {
    pub(crate) fn with_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = ProtocolEvent>,
    {
        Self {
            events: events.into_iter().map(Ok).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn push_event(&mut self, event: ProtocolEvent) {
        self.events.push_back(Ok(event));
    }

    pub(crate) fn push_transport_error(&mut self, err: TransportError) {
        self.events.push_back(Err(err));
    }

    pub(crate) fn requests(&self) -> Vec<EngineCall> {
        self.calls
            .iter()
            .filter(|call| call.is_request())
            .cloned()
            .collect()
    }

    pub(crate) fn count(&self, call: &EngineCall) -> usize {
        self.calls.iter().filter(|seen| *seen == call).count()
    }

    fn record(&mut self, call: EngineCall) {
        self.calls.push(call);
    }
}

impl DebugEngine for FakeEngine {
    fn poll_event(&mut self) -> EngineResult<ProtocolEvent> {
        self.record(EngineCall::Poll);
        self.events.pop_front().unwrap_or(Ok(ProtocolEvent::End))
    }

    fn has_ended(&self) -> bool {
        self.ended
    }

    fn set_breakpoint(&mut self, location: &str) -> EngineResult<String> {
        self.record(EngineCall::SetBreakpoint(location.to_string()));
        self.breakpoints.push(location.to_string());
        Ok(format!(
            "Breakpoint {} at {location} (pending)\n",
            self.breakpoints.len()
        ))
    }

    fn list_breakpoints(&mut self) -> EngineResult<String> {
        self.record(EngineCall::ListBreakpoints);
        if self.breakpoints.is_empty() {
            return Ok("No breakpoints\n".to_string());
        }
        Ok(self
            .breakpoints
            .iter()
            .enumerate()
            .map(|(idx, location)| format!("{}: {location} (pending)\n", idx + 1))
            .collect())
    }

    fn delete_breakpoint(&mut self, selector: &str) -> EngineResult<String> {
        self.record(EngineCall::DeleteBreakpoint(selector.to_string()));
        if selector == "all" {
            self.breakpoints.clear();
        }
        Ok(String::new())
    }

    fn resume(&mut self) -> EngineResult<()> {
        self.record(EngineCall::Resume);
        Ok(())
    }

    fn step(&mut self) -> EngineResult<()> {
        self.record(EngineCall::Step);
        Ok(())
    }

    fn next(&mut self) -> EngineResult<()> {
        self.record(EngineCall::Next);
        Ok(())
    }

    fn finish(&mut self) -> EngineResult<()> {
        self.record(EngineCall::Finish);
        Ok(())
    }

    fn source(&mut self, line_hint: u32, offset: i64) -> EngineResult<String> {
        self.record(EngineCall::Source(line_hint, offset));
        Ok(format!("source {line_hint} {offset}\n"))
    }

    fn evaluate(&mut self, expression: &str) -> EngineResult<()> {
        self.record(EngineCall::Evaluate(expression.to_string()));
        Ok(())
    }

    fn backtrace(&mut self, args: &str) -> EngineResult<String> {
        self.record(EngineCall::Backtrace(args.to_string()));
        Ok("#0 main\n".to_string())
    }

    fn scope_chain(&mut self, args: &str) -> EngineResult<String> {
        self.record(EngineCall::ScopeChain(args.to_string()));
        Ok(String::new())
    }

    fn scope_variables(&mut self, args: &str) -> EngineResult<String> {
        self.record(EngineCall::ScopeVariables(args.to_string()));
        Ok("x = 1\n".to_string())
    }

    fn object(&mut self, index: &str) -> EngineResult<String> {
        self.record(EngineCall::Object(index.to_string()));
        Ok(format!("object {index}\n"))
    }

    fn dump(&mut self) -> EngineResult<String> {
        self.record(EngineCall::Dump);
        Ok("functions: main\n".to_string())
    }

    fn set_exception_stop(&mut self, enabled: bool) -> EngineResult<String> {
        self.record(EngineCall::ExceptionStop(enabled));
        Ok(String::new())
    }

    fn terminate(&mut self) -> EngineResult<()> {
        self.record(EngineCall::Terminate);
        Ok(())
    }
}

/// Operator lines fed from a fixed script; `None` once exhausted.
#[derive(Debug, Default)]
pub(crate) struct ScriptedLines {
    lines: VecDeque<String>,
    pub(crate) prompts: usize,
}

impl ScriptedLines {
    pub(crate) fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|line| format!("{line}\n")).collect(),
            prompts: 0,
        }
    }
}

impl LineSource for ScriptedLines {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        self.prompts += 1;
        Ok(self.lines.pop_front())
    }
}

/// Keystrokes fed from a fixed script; `None` once exhausted.
#[derive(Debug, Default)]
pub(crate) struct ScriptedKeys {
    keys: VecDeque<char>,
}

impl ScriptedKeys {
    pub(crate) fn new(keys: &str) -> Self {
        Self {
            keys: keys.chars().collect(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn read_key(&mut self) -> io::Result<Option<char>> {
        Ok(self.keys.pop_front())
    }
}

pub(crate) fn output_text(out: &[u8]) -> String {
    String::from_utf8(out.to_vec()).expect("utf8 output")
}
