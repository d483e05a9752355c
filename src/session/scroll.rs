//! Modal source scrolling driven by single keystrokes.
//!
//! No engine events are polled while scrolling; anything the engine sends in
//! the meantime stays queued and is displayed by the driver after `q`.

use std::io::Write;

use super::input::KeySource;
use super::{CommandContext, SessionResult};
use crate::engine::DebugEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    ScrollIdle,
    ScrollExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKey {
    Up,
    Down,
    Quit,
    Invalid,
}

impl ScrollKey {
    #[must_use]
    pub fn from_char(key: char) -> Self {
        match key {
            'w' => Self::Up,
            's' => Self::Down,
            'q' => Self::Quit,
            _ => Self::Invalid,
        }
    }
}

impl ScrollState {
    /// Next state after `key`; only `Quit` leaves the idle state.
    #[must_use]
    pub fn on_key(self, key: ScrollKey) -> Self {
        match (self, key) {
            (Self::ScrollExit, _) | (Self::ScrollIdle, ScrollKey::Quit) => Self::ScrollExit,
            (Self::ScrollIdle, _) => Self::ScrollIdle,
        }
    }
}

/// Run the scroll loop until `q` (or end of key input).
///
/// Each `w`/`s` shifts the offset by a third of the display window and
/// re-renders the listing.
///
/// # Errors
///
/// Fails on transport errors from the source request or terminal I/O errors.
pub fn run_scroll<E, K, W>(ctx: &mut CommandContext<'_, E, K, W>) -> SessionResult<()>
where
    E: DebugEngine,
    K: KeySource,
    W: Write,
{
    let mut state = ScrollState::ScrollIdle;
    while state == ScrollState::ScrollIdle {
        let Some(ch) = ctx.keys.read_key()? else {
            break;
        };
        let key = ScrollKey::from_char(ch);
        let offset = match key {
            ScrollKey::Up => Some(ctx.state.scroll_up()),
            ScrollKey::Down => Some(ctx.state.scroll_down()),
            ScrollKey::Quit => None,
            ScrollKey::Invalid => {
                writeln!(ctx.out, "Invalid key")?;
                None
            }
        };
        if let Some(offset) = offset {
            let listing = ctx.engine.source(ctx.state.display_lines, offset)?;
            ctx.out.write_all(listing.as_bytes())?;
            if !listing.ends_with('\n') {
                writeln!(ctx.out)?;
            }
        }
        state = state.on_key(key);
    }
    ctx.out.flush()?;
    Ok(())
}
