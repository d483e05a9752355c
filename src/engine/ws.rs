//! Blocking WebSocket client for the engine's debugger endpoint.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::TcpStream;

use tungstenite::handshake::HandshakeError;
use tungstenite::{Message, WebSocket};

use super::protocol::{EngineMessage, EngineRequest, RequestFrame};
use super::{DebugEngine, EngineResult, ProtocolEvent, TransportError};
use crate::{log_debug, log_debug_content};

/// Endpoint path the engine's debugger server listens on.
pub const DEBUGGER_PATH: &str = "/escargot-debugger";

/// `DebugEngine` over a WebSocket stream.
///
/// Events that arrive while a request waits for its reply are queued in
/// arrival order and handed out by `poll_event` before anything new is read.
/// A prompt stays observable until a request resumes the engine.
pub struct WsEngine<S = TcpStream>
where
    S: Read + Write,
{
    socket: WebSocket<S>,
    pending: VecDeque<ProtocolEvent>,
    next_id: u64,
    suspended: bool,
    closed: bool,
}

impl WsEngine<TcpStream> {
    /// Open a TCP connection to `address` (`host:port`) and perform the handshake.
    ///
    /// # Errors
    ///
    /// Returns a classified [`TransportError`] when the TCP connect or the
    /// WebSocket handshake fails.
    pub fn connect(address: &str) -> EngineResult<Self> {
        let stream = TcpStream::connect(address).map_err(|err| TransportError::from_io(&err))?;
        stream
            .set_nodelay(true)
            .map_err(|err| TransportError::from_io(&err))?;
        let url = format!("ws://{address}{DEBUGGER_PATH}");
        let (socket, _response) = tungstenite::client(url.as_str(), stream).map_err(|err| {
            match err {
                HandshakeError::Failure(err) => classify_ws_error(err),
                HandshakeError::Interrupted(_) => {
                    TransportError::Other("websocket handshake interrupted".to_string())
                }
            }
        })?;
        log_debug(&format!("connected to engine at {url}"));
        Ok(Self::from_socket(socket))
    }
}

impl<S> WsEngine<S>
where
    S: Read + Write,
{
    /// Wrap an already-established socket.
    pub fn from_socket(socket: WebSocket<S>) -> Self {
        Self {
            socket,
            pending: VecDeque::new(),
            next_id: 1,
            suspended: false,
            closed: false,
        }
    }

    /// Upload a script so the engine can run code that does not exist on its side.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the frame cannot be written.
    pub fn send_client_source(&mut self, name: &str, source: &str) -> EngineResult<()> {
        self.request(EngineRequest::ClientSource {
            name: name.to_string(),
            source: source.to_string(),
        })
        .map(|_| ())
    }

    fn send(&mut self, request: EngineRequest) -> EngineResult<u64> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let id = self.next_id;
        self.next_id += 1;
        if request.resumes_execution() {
            self.suspended = false;
        }
        let frame = RequestFrame { id, request };
        let json = serde_json::to_string(&frame)
            .map_err(|err| TransportError::Other(format!("request encoding failed: {err}")))?;
        log_debug_content(&format!("engine request: {json}"));
        self.socket
            .send(Message::text(json))
            .map_err(classify_ws_error)?;
        Ok(id)
    }

    /// Send a request and, when the engine answers it with a reply frame,
    /// block until that reply arrives.
    ///
    /// Requests without a reply yield an empty string. If the engine ends the
    /// session first, the reply is empty too and everything received up to
    /// the end stays queued for `poll_event`.
    fn request(&mut self, request: EngineRequest) -> EngineResult<String> {
        let expects_reply = request.expects_reply();
        let id = self.send(request)?;
        if !expects_reply {
            return Ok(String::new());
        }
        while !self.closed {
            match self.read_message()? {
                Some(EngineMessage::Reply { id: reply_id, text }) if reply_id == id => {
                    return Ok(text);
                }
                Some(EngineMessage::Reply { id: stale, .. }) => {
                    log_debug(&format!("dropping reply for unknown request {stale}"));
                }
                Some(message) => self.queue(message),
                None => self.queue(EngineMessage::Closed),
            }
        }
        log_debug(&format!("engine ended session before answering request {id}"));
        Ok(String::new())
    }

    fn queue(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::Output { text } => self.pending.push_back(ProtocolEvent::Text(text)),
            EngineMessage::Prompt => {
                self.suspended = true;
                self.pending.push_back(ProtocolEvent::Prompt);
            }
            EngineMessage::Closed => {
                self.closed = true;
                self.pending.push_back(ProtocolEvent::End);
            }
            EngineMessage::Reply { id, .. } => {
                log_debug(&format!("unexpected reply for request {id}"));
            }
        }
    }

    /// Read the next engine message, skipping control frames. `None` means closed.
    fn read_message(&mut self) -> EngineResult<Option<EngineMessage>> {
        loop {
            let message = match self.socket.read() {
                Ok(message) => message,
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(None);
                }
                Err(err) => return Err(classify_ws_error(err)),
            };
            match &message {
                Message::Close(_) => return Ok(None),
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
                Message::Text(_) | Message::Binary(_) => {}
            }
            let text = message
                .to_text()
                .map_err(|err| TransportError::Other(format!("invalid engine frame: {err}")))?;
            log_debug_content(&format!("engine message: {text}"));
            let parsed = serde_json::from_str::<EngineMessage>(text)
                .map_err(|err| TransportError::Other(format!("invalid engine message: {err}")))?;
            return Ok(Some(parsed));
        }
    }
}

impl<S> DebugEngine for WsEngine<S>
where
    S: Read + Write,
{
    fn poll_event(&mut self) -> EngineResult<ProtocolEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(event);
        }
        if self.closed {
            return Ok(ProtocolEvent::End);
        }
        if self.suspended {
            return Ok(ProtocolEvent::Prompt);
        }
        loop {
            match self.read_message()? {
                Some(EngineMessage::Reply { id, .. }) => {
                    log_debug(&format!("dropping late reply for request {id}"));
                }
                Some(message) => {
                    self.queue(message);
                    if let Some(event) = self.pending.pop_front() {
                        return Ok(event);
                    }
                }
                None => {
                    self.closed = true;
                    return Ok(ProtocolEvent::End);
                }
            }
        }
    }

    fn has_ended(&self) -> bool {
        self.closed
    }

    fn set_breakpoint(&mut self, location: &str) -> EngineResult<String> {
        self.request(EngineRequest::SetBreakpoint {
            location: location.to_string(),
        })
    }

    fn list_breakpoints(&mut self) -> EngineResult<String> {
        self.request(EngineRequest::ListBreakpoints)
    }

    fn delete_breakpoint(&mut self, selector: &str) -> EngineResult<String> {
        self.request(EngineRequest::DeleteBreakpoint {
            selector: selector.to_string(),
        })
    }

    fn resume(&mut self) -> EngineResult<()> {
        self.request(EngineRequest::Resume).map(|_| ())
    }

    fn step(&mut self) -> EngineResult<()> {
        self.request(EngineRequest::Step).map(|_| ())
    }

    fn next(&mut self) -> EngineResult<()> {
        self.request(EngineRequest::Next).map(|_| ())
    }

    fn finish(&mut self) -> EngineResult<()> {
        self.request(EngineRequest::Finish).map(|_| ())
    }

    fn source(&mut self, line_hint: u32, offset: i64) -> EngineResult<String> {
        self.request(EngineRequest::Source {
            line: line_hint,
            offset,
        })
    }

    fn evaluate(&mut self, expression: &str) -> EngineResult<()> {
        self.request(EngineRequest::Evaluate {
            expression: expression.to_string(),
        })
        .map(|_| ())
    }

    fn backtrace(&mut self, args: &str) -> EngineResult<String> {
        self.request(EngineRequest::Backtrace {
            args: args.to_string(),
        })
    }

    fn scope_chain(&mut self, args: &str) -> EngineResult<String> {
        self.request(EngineRequest::ScopeChain {
            args: args.to_string(),
        })
    }

    fn scope_variables(&mut self, args: &str) -> EngineResult<String> {
        self.request(EngineRequest::ScopeVariables {
            args: args.to_string(),
        })
    }

    fn object(&mut self, index: &str) -> EngineResult<String> {
        self.request(EngineRequest::Object {
            index: index.to_string(),
        })
    }

    fn dump(&mut self) -> EngineResult<String> {
        self.request(EngineRequest::Dump)
    }

    fn set_exception_stop(&mut self, enabled: bool) -> EngineResult<String> {
        self.request(EngineRequest::ExceptionStop { enabled })
    }

    fn terminate(&mut self) -> EngineResult<()> {
        if self.closed {
            return Ok(());
        }
        self.send(EngineRequest::Terminate)?;
        self.closed = true;
        if let Err(err) = self.socket.close(None) {
            log_debug(&format!("websocket close after terminate failed: {err}"));
        }
        Ok(())
    }
}

fn classify_ws_error(err: tungstenite::Error) -> TransportError {
    match err {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            TransportError::Closed
        }
        tungstenite::Error::Io(io_err) => TransportError::from_io(&io_err),
        tungstenite::Error::Protocol(
            tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
        ) => TransportError::Closed,
        other => TransportError::Other(other.to_string()),
    }
}
