//! Operator command parsing and dispatch.
//!
//! Every handler either applies its whole effect or reports a local error and
//! applies none; malformed arguments never reach the engine.

use std::io::Write;
use std::num::NonZeroU32;

use super::input::{KeySource, LineSource, PROMPT};
use super::repeat::{repeat_step, DrainOutcome, StepKind};
use super::scroll::run_scroll;
use super::{CommandContext, PromptFlow, SessionResult};
use crate::engine::DebugEngine;
use crate::{log_debug, log_debug_content};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Break,
    List,
    Delete,
    Continue,
    Step,
    Next,
    Finish,
    Source,
    Scroll,
    Eval,
    Backtrace,
    Scope,
    Variables,
    Object,
    Display,
    Exception,
    Dump,
    Help,
    Quit,
}

impl Command {
    pub const ALL: [Command; 19] = [
        Command::Break,
        Command::List,
        Command::Delete,
        Command::Continue,
        Command::Step,
        Command::Next,
        Command::Finish,
        Command::Source,
        Command::Scroll,
        Command::Eval,
        Command::Backtrace,
        Command::Scope,
        Command::Variables,
        Command::Object,
        Command::Display,
        Command::Exception,
        Command::Dump,
        Command::Help,
        Command::Quit,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::List => "list",
            Self::Delete => "delete",
            Self::Continue => "continue",
            Self::Step => "step",
            Self::Next => "next",
            Self::Finish => "finish",
            Self::Source => "src",
            Self::Scroll => "scroll",
            Self::Eval => "eval",
            Self::Backtrace => "backtrace",
            Self::Scope => "scope",
            Self::Variables => "variables",
            Self::Object => "object",
            Self::Display => "display",
            Self::Exception => "exception",
            Self::Dump => "dump",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }

    #[must_use]
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Break => &["b"],
            Self::Continue => &["c"],
            Self::Step => &["s"],
            Self::Next => &["n"],
            Self::Finish => &["f"],
            Self::Source => &["source"],
            Self::Eval => &["e"],
            Self::Backtrace => &["bt"],
            _ => &[],
        }
    }

    #[must_use]
    pub fn from_verb(verb: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.name() == verb || command.aliases().contains(&verb))
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Break => "Insert a breakpoint on the given line or function",
            Self::List => "List the available breakpoints",
            Self::Delete => "Delete a breakpoint by index, or all|active|pending breakpoints",
            Self::Continue => "Continue execution",
            Self::Step => "Step into functions; `step N` repeats N times",
            Self::Next => "Step over calls in the same context; `next N` repeats N times",
            Self::Finish => "Continue running until the current function returns",
            Self::Source => "Print source around the current line, or around line N",
            Self::Scroll => "Scroll the source listing: w = up, s = down, q = quit",
            Self::Eval => "Evaluate an expression in the current context",
            Self::Backtrace => "Print the call stack",
            Self::Scope => "Print the lexical environment chain",
            Self::Variables => "Print the variables of a scope",
            Self::Object => "Print an object by index",
            Self::Display => "Show N source lines when execution stops (0 turns it off)",
            Self::Exception => "Stop on thrown exceptions: 1 = on, 0 = off",
            Self::Dump => "Dump the engine's function table",
            Self::Help => "List commands, or describe one command",
            Self::Quit => "Exit the debugger",
        }
    }
}

/// One operator line split into verb and raw argument text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    Empty,
    Command { command: Command, args: &'a str },
    Unknown(&'a str),
}

#[must_use]
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ParsedLine::Empty;
    }
    let (verb, args) = match line.split_once(char::is_whitespace) {
        Some((verb, args)) => (verb, args.trim()),
        None => (line, ""),
    };
    match Command::from_verb(verb) {
        Some(command) => ParsedLine::Command { command, args },
        None => ParsedLine::Unknown(verb),
    }
}

/// Local argument validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ArgError {
    Missing,
    Unexpected,
    NonNegativeExpected(String),
    PositiveExpected(String),
    FlagExpected(String),
}

impl std::fmt::Display for ArgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "Error: Argument expected"),
            Self::Unexpected => write!(f, "Error: No argument expected"),
            Self::NonNegativeExpected(raw) => {
                write!(f, "Error: Non-negative integer number expected: {raw}")
            }
            Self::PositiveExpected(raw) => write!(f, "Error: Positive integer expected: {raw}"),
            Self::FlagExpected(raw) => write!(f, "Error: 0 or 1 expected: {raw}"),
        }
    }
}

pub(crate) fn parse_non_negative(args: &str) -> Result<u32, ArgError> {
    args.trim()
        .parse::<u32>()
        .map_err(|_| ArgError::NonNegativeExpected(args.trim().to_string()))
}

pub(crate) fn parse_repeat_count(args: &str) -> Result<NonZeroU32, ArgError> {
    args.trim()
        .parse::<NonZeroU32>()
        .map_err(|_| ArgError::PositiveExpected(args.trim().to_string()))
}

pub(crate) fn parse_flag(args: &str) -> Result<bool, ArgError> {
    match args.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(ArgError::FlagExpected(other.to_string())),
    }
}

fn require_args(args: &str) -> Result<&str, ArgError> {
    if args.is_empty() {
        Err(ArgError::Missing)
    } else {
        Ok(args)
    }
}

/// Reads operator lines and runs commands until one hands control back.
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    prompt: String,
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::new(PROMPT)
    }
}

impl CommandInterpreter {
    #[must_use]
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
        }
    }

    /// One prompt cycle: keep reading commands until a handler returns control
    /// to the driver or operator input ends.
    ///
    /// # Errors
    ///
    /// Fails on engine transport errors or operator terminal I/O errors.
    pub fn run_cycle<L, E, K, W>(
        &self,
        lines: &mut L,
        ctx: &mut CommandContext<'_, E, K, W>,
    ) -> SessionResult<()>
    where
        L: LineSource,
        E: DebugEngine,
        K: KeySource,
        W: Write,
    {
        loop {
            let Some(line) = lines.read_line(&self.prompt)? else {
                return self.end_of_input(ctx);
            };
            if self.execute(&line, ctx)? == PromptFlow::ReturnToDriver {
                return Ok(());
            }
        }
    }

    /// Parse and run a single operator line.
    ///
    /// # Errors
    ///
    /// Fails on engine transport errors or operator terminal I/O errors.
    pub fn execute<E, K, W>(
        &self,
        line: &str,
        ctx: &mut CommandContext<'_, E, K, W>,
    ) -> SessionResult<PromptFlow>
    where
        E: DebugEngine,
        K: KeySource,
        W: Write,
    {
        let line = line.trim_end_matches(['\n', '\r']);
        if ctx.state.non_interactive {
            writeln!(ctx.out, "{line}")?;
        }
        log_debug_content(&format!("operator command: {line:?}"));

        let flow = match parse_line(line) {
            ParsedLine::Empty => PromptFlow::KeepPrompting,
            ParsedLine::Unknown(verb) => {
                writeln!(ctx.out, "Error: Unknown command: {verb} (type help)")?;
                PromptFlow::KeepPrompting
            }
            ParsedLine::Command { command, args } => dispatch(command, args, ctx)?,
        };
        // Queued engine output and the end of session are only shown by the driver.
        let flow = if flow == PromptFlow::KeepPrompting && ctx.engine.has_ended() {
            log_debug("engine ended the session during a command");
            PromptFlow::ReturnToDriver
        } else {
            flow
        };
        ctx.out.flush()?;
        Ok(flow)
    }

    fn end_of_input<E, K, W>(&self, ctx: &mut CommandContext<'_, E, K, W>) -> SessionResult<()>
    where
        E: DebugEngine,
        W: Write,
    {
        writeln!(ctx.out, "Unexpected end of input. Connection closed.")?;
        ctx.out.flush()?;
        ctx.state.input_ended = true;
        quit(ctx)?;
        Ok(())
    }
}

fn dispatch<E, K, W>(
    command: Command,
    args: &str,
    ctx: &mut CommandContext<'_, E, K, W>,
) -> SessionResult<PromptFlow>
where
    E: DebugEngine,
    K: KeySource,
    W: Write,
{
    use PromptFlow::{KeepPrompting, ReturnToDriver};

    let flow = match command {
        Command::Break => match require_args(args) {
            Ok(location) => {
                let reply = ctx.engine.set_breakpoint(location)?;
                write_reply(ctx.out, &reply)?;
                KeepPrompting
            }
            Err(err) => report(ctx.out, &err)?,
        },
        Command::List => {
            let reply = ctx.engine.list_breakpoints()?;
            write_reply(ctx.out, &reply)?;
            KeepPrompting
        }
        Command::Delete => match require_args(args) {
            Ok(selector) => {
                let reply = ctx.engine.delete_breakpoint(selector)?;
                write_reply(ctx.out, &reply)?;
                KeepPrompting
            }
            Err(err) => report(ctx.out, &err)?,
        },
        Command::Continue => {
            ctx.engine.resume()?;
            if !ctx.state.non_interactive {
                writeln!(ctx.out, "Press enter to stop JavaScript execution.")?;
            }
            ReturnToDriver
        }
        Command::Step => step(StepKind::Step, args, ctx)?,
        Command::Next => step(StepKind::Next, args, ctx)?,
        Command::Finish => {
            ctx.engine.finish()?;
            ReturnToDriver
        }
        Command::Source => {
            let line = if args.is_empty() {
                Ok(0)
            } else {
                parse_non_negative(args)
            };
            match line {
                Ok(line) => {
                    let reply = ctx.engine.source(line, 0)?;
                    write_reply(ctx.out, &reply)?;
                    KeepPrompting
                }
                Err(err) => report(ctx.out, &err)?,
            }
        }
        Command::Scroll => {
            run_scroll(ctx)?;
            KeepPrompting
        }
        Command::Eval => {
            ctx.engine.evaluate(args)?;
            ReturnToDriver
        }
        Command::Backtrace => {
            let reply = ctx.engine.backtrace(args)?;
            write_reply(ctx.out, &reply)?;
            ReturnToDriver
        }
        Command::Scope => {
            let reply = ctx.engine.scope_chain(args)?;
            write_reply(ctx.out, &reply)?;
            ReturnToDriver
        }
        Command::Variables => {
            let reply = ctx.engine.scope_variables(args)?;
            write_reply(ctx.out, &reply)?;
            ReturnToDriver
        }
        Command::Object => match require_args(args) {
            Ok(index) => {
                let reply = ctx.engine.object(index)?;
                write_reply(ctx.out, &reply)?;
                ReturnToDriver
            }
            Err(err) => report(ctx.out, &err)?,
        },
        Command::Display => {
            if args.is_empty() {
                report_display(ctx.out, ctx.state.display_lines)?;
                KeepPrompting
            } else {
                match parse_non_negative(args) {
                    Ok(lines) => {
                        ctx.state.display_lines = lines;
                        KeepPrompting
                    }
                    Err(err) => report(ctx.out, &err)?,
                }
            }
        }
        Command::Exception => match parse_flag(args) {
            Ok(enabled) => {
                let reply = ctx.engine.set_exception_stop(enabled)?;
                write_reply(ctx.out, &reply)?;
                KeepPrompting
            }
            Err(err) => report(ctx.out, &err)?,
        },
        Command::Dump => {
            if args.is_empty() {
                let reply = ctx.engine.dump()?;
                write_reply(ctx.out, &reply)?;
                KeepPrompting
            } else {
                report(ctx.out, &ArgError::Unexpected)?
            }
        }
        Command::Help => {
            write_help(ctx.out, args)?;
            KeepPrompting
        }
        Command::Quit => {
            quit(ctx)?;
            ReturnToDriver
        }
    };
    Ok(flow)
}

fn step<E, K, W>(
    kind: StepKind,
    args: &str,
    ctx: &mut CommandContext<'_, E, K, W>,
) -> SessionResult<PromptFlow>
where
    E: DebugEngine,
    W: Write,
{
    if args.is_empty() {
        match kind {
            StepKind::Step => ctx.engine.step()?,
            StepKind::Next => ctx.engine.next()?,
        }
        return Ok(PromptFlow::ReturnToDriver);
    }
    let count = match parse_repeat_count(args) {
        Ok(count) => count,
        Err(err) => return report(ctx.out, &err),
    };
    if repeat_step(ctx.engine, ctx.out, kind, count, ctx.step_delay)? == DrainOutcome::End {
        ctx.state.remote_closed = true;
    }
    Ok(PromptFlow::ReturnToDriver)
}

/// Send the termination notice once and stop prompting for good.
fn quit<E, K, W>(ctx: &mut CommandContext<'_, E, K, W>) -> SessionResult<()>
where
    E: DebugEngine,
{
    if ctx.state.quit_requested {
        return Ok(());
    }
    ctx.state.quit_requested = true;
    log_debug("operator quit; sending terminate");
    ctx.engine.terminate()?;
    Ok(())
}

fn report<W: Write>(out: &mut W, err: &ArgError) -> SessionResult<PromptFlow> {
    writeln!(out, "{err}")?;
    Ok(PromptFlow::KeepPrompting)
}

fn write_reply<W: Write>(out: &mut W, reply: &str) -> SessionResult<()> {
    out.write_all(reply.as_bytes())?;
    Ok(())
}

fn report_display<W: Write>(out: &mut W, lines: u32) -> SessionResult<()> {
    if lines == 0 {
        writeln!(out, "Source display is off; use `display N` to show N lines")?;
    } else {
        writeln!(out, "Source display: {lines} lines")?;
    }
    Ok(())
}

fn write_help<W: Write>(out: &mut W, topic: &str) -> SessionResult<()> {
    if !topic.is_empty() {
        match Command::from_verb(topic) {
            Some(command) => writeln!(out, "{}", command.description())?,
            None => writeln!(out, "No help on {topic}")?,
        }
        return Ok(());
    }
    writeln!(out, "Commands (type help <command> for details):")?;
    for command in Command::ALL {
        let mut names = command.name().to_string();
        for alias in command.aliases() {
            names.push_str(", ");
            names.push_str(alias);
        }
        writeln!(out, "  {names:<18}{}", command.description())?;
    }
    Ok(())
}
