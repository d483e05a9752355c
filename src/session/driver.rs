//! Top-level event loop: engine output until a prompt, then operator commands.

use std::io::{self, Write};
use std::time::Duration;

use super::commands::CommandInterpreter;
use super::input::{KeySource, LineSource};
use super::{CommandContext, SessionEnd, SessionError, SessionState};
use crate::engine::{DebugEngine, ProtocolEvent};
use crate::{log_debug, log_debug_content};

pub struct SessionDriver<E, L, K, W> {
    engine: E,
    lines: L,
    keys: K,
    out: W,
    state: SessionState,
    step_delay: Duration,
    interpreter: CommandInterpreter,
}

impl<E, L, K, W> SessionDriver<E, L, K, W>
where
    E: DebugEngine,
    L: LineSource,
    K: KeySource,
    W: Write,
{
    pub fn new(
        engine: E,
        lines: L,
        keys: K,
        out: W,
        state: SessionState,
        step_delay: Duration,
    ) -> Self {
        Self {
            engine,
            lines,
            keys,
            out,
            state,
            step_delay,
            interpreter: CommandInterpreter::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn into_parts(self) -> (E, W) {
        (self.engine, self.out)
    }

    /// Run until the operator quits, input ends, or the engine goes away.
    ///
    /// Transport failures end the session rather than erroring; only operator
    /// terminal failures surface as `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error when the operator terminal cannot be read or written.
    pub fn run(&mut self) -> io::Result<SessionEnd> {
        loop {
            if let Some(end) = self.finished() {
                self.out.flush()?;
                log_debug(&format!("session finished: {end:?}"));
                return Ok(end);
            }

            let event = match self.engine.poll_event() {
                Ok(event) => event,
                Err(err) => return self.transport_failed(SessionError::Transport(err)),
            };
            match event {
                ProtocolEvent::End => self.state.remote_closed = true,
                ProtocolEvent::Text(text) => {
                    log_debug_content(&format!("engine text: {text:?}"));
                    self.out.write_all(text.as_bytes())?;
                    self.out.flush()?;
                }
                ProtocolEvent::Prompt => {
                    let mut ctx = CommandContext {
                        engine: &mut self.engine,
                        keys: &mut self.keys,
                        out: &mut self.out,
                        state: &mut self.state,
                        step_delay: self.step_delay,
                    };
                    if let Err(err) = self.interpreter.run_cycle(&mut self.lines, &mut ctx) {
                        return self.transport_failed(err);
                    }
                }
            }
        }
    }

    fn finished(&self) -> Option<SessionEnd> {
        if !self.state.finished() {
            return None;
        }
        Some(if self.state.input_ended {
            SessionEnd::EndOfInput
        } else if self.state.quit_requested {
            SessionEnd::Quit
        } else {
            SessionEnd::RemoteClosed
        })
    }

    fn transport_failed(&mut self, err: SessionError) -> io::Result<SessionEnd> {
        match err {
            SessionError::Io(err) => Err(err),
            SessionError::Transport(err) => {
                log_debug(&format!("engine transport failed: {err}"));
                self.state.quit_requested = true;
                self.out.flush()?;
                Ok(SessionEnd::Transport(err))
            }
        }
    }
}
