//! Operator input sources: whole command lines and single scroll keys.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::terminal_restore::TerminalRestoreGuard;

/// Prompt shown before each operator command.
pub const PROMPT: &str = "(escargot-debugger) ";

/// Source of operator command lines. `None` means end of input.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Source of single keystrokes for modal input. `None` means end of input.
pub trait KeySource {
    fn read_key(&mut self) -> io::Result<Option<char>>;
}

/// Line reader over the process stdin; the prompt goes to stdout.
#[derive(Debug, Default)]
pub struct StdinLines;

impl LineSource for StdinLines {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;
        drop(stdout);
        read_stdin_line()
    }
}

/// Key reader: raw-mode keystrokes on a terminal, first character per line otherwise.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn read_key(&mut self) -> io::Result<Option<char>> {
        if io::stdin().is_terminal() {
            return read_raw_key();
        }
        Ok(read_stdin_line()?.map(|line| line.trim().chars().next().unwrap_or('\n')))
    }
}

fn read_stdin_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn read_raw_key() -> io::Result<Option<char>> {
    let guard = TerminalRestoreGuard::new();
    guard.enable_raw_mode()?;
    loop {
        if let Event::Key(key) = event::read()? {
            if let Some(mapped) = map_key_event(key) {
                return Ok(mapped);
            }
        }
    }
}

/// `Some(None)` ends input (Ctrl-D / Ctrl-C), `None` skips the event.
fn map_key_event(key: KeyEvent) -> Option<Option<char>> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(None),
        KeyCode::Char(ch) => Some(Some(ch)),
        KeyCode::Up => Some(Some('w')),
        KeyCode::Down => Some(Some('s')),
        KeyCode::Esc => Some(Some('q')),
        KeyCode::Enter => Some(Some('\n')),
        _ => None,
    }
}
