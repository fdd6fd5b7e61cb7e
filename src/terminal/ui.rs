//! Interactive terminal: keyboard input and preview output.

use crossterm::event::{self, Event};
use crossterm::queue;
use crossterm::terminal::{self, Clear, ClearType};
use std::io::{self, Stdout};
use std::time::Duration;

use super::preview;
use super::raw_mode::RawModeGuard;
use crate::compositor::CompositeBuffer;
use crate::input::key_event_to_char;
use crate::session::{KeySource, Screen, StatusLine};

/// Keyboard events from the controlling terminal.
///
/// Only meaningful while a [`TerminalScreen`] holds the terminal in raw mode.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<char>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(key_event_to_char(key)),
            _ => Ok(None),
        }
    }
}

/// Full-screen preview on the alternate screen.
///
/// The terminal is restored when this is dropped.
pub struct TerminalScreen {
    guard: RawModeGuard,
    stdout: Stdout,
    /// Size at the last draw; a change forces a clear
    last_size: Option<(u16, u16)>,
}

impl TerminalScreen {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            guard: RawModeGuard::enter()?,
            stdout: io::stdout(),
            last_size: None,
        })
    }

    /// Restore the terminal before the process prints anything else.
    pub fn restore(&mut self) -> io::Result<()> {
        self.guard.exit()
    }
}

impl Screen for TerminalScreen {
    fn show(&mut self, buffer: &CompositeBuffer, status: &StatusLine) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        if self.last_size != Some((cols, rows)) {
            queue!(self.stdout, Clear(ClearType::All))?;
            self.last_size = Some((cols, rows));
        }
        preview::draw(&mut self.stdout, buffer, status, cols, rows)
    }
}
