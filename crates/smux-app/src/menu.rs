//! Full-screen selection menu.
//!
//! The menu draws its options on the alternate screen buffer, one per
//! line, with the selected entry highlighted. Arrow keys move the
//! selection (wrapping at both ends), Enter confirms, Space cancels.

use anyhow::{Context, Result};
use smux_pty::io::{read_byte, write_all};
use smux_pty::RawMode;

use crate::escape::{
    CursorDir, ALT_SCREEN_ENTER, ALT_SCREEN_EXIT, HIGHLIGHT, KEY_ARROW_DOWN, KEY_ARROW_UP,
    KEY_BRACKET, KEY_ENTER, KEY_ESC, KEY_SPACE, RESET_ATTRIBUTES,
};

const PROMPT: &[u8] = b"Use UP/DOWN to navigate, ENTER to select an option, SPACE to exit.\r\n";

/// Outcome of running a menu to completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The user confirmed the option at this index.
    Choice(usize),
    /// The user dismissed the menu without choosing.
    Cancelled,
    /// Stdin closed while the menu was open.
    Eof,
}

/// Menu behaviour toggles.
pub struct MenuConfig {
    /// Draw on the alternate screen buffer and restore it on close.
    pub alt_screen: bool,
    /// Put the terminal into raw mode for the menu's lifetime. Callers
    /// that already run raw leave this off.
    pub manage_raw_mode: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        MenuConfig {
            alt_screen: true,
            manage_raw_mode: false,
        }
    }
}

pub struct Menu<'a> {
    options: &'a [String],
    current: usize,
    alt_screen: bool,
    raw: Option<RawMode>,
    open: bool,
}

impl<'a> Menu<'a> {
    /// Draws the menu and returns it ready to take input.
    pub fn open(options: &'a [String], config: MenuConfig) -> Result<Menu<'a>> {
        let raw = if config.manage_raw_mode {
            Some(RawMode::activate().context("entering raw mode for menu")?)
        } else {
            None
        };
        let menu = Menu {
            options,
            current: 0,
            alt_screen: config.alt_screen,
            raw,
            open: true,
        };
        if menu.alt_screen {
            write_all(libc::STDOUT_FILENO, ALT_SCREEN_ENTER)?;
        }
        write_all(libc::STDOUT_FILENO, PROMPT)?;
        menu.print_options()?;
        Ok(menu)
    }

    /// Consumes input until the user decides or stdin closes.
    pub fn run(&mut self) -> Result<Selection> {
        loop {
            let Some(byte) = read_byte(libc::STDIN_FILENO)? else {
                return Ok(Selection::Eof);
            };
            match byte {
                KEY_SPACE => return Ok(Selection::Cancelled),
                KEY_ENTER => {
                    if self.options.is_empty() {
                        return Ok(Selection::Cancelled);
                    }
                    return Ok(Selection::Choice(self.current));
                }
                KEY_ESC => {
                    let Some(next) = read_byte(libc::STDIN_FILENO)? else {
                        return Ok(Selection::Eof);
                    };
                    if next != KEY_BRACKET {
                        continue;
                    }
                    let Some(arrow) = read_byte(libc::STDIN_FILENO)? else {
                        return Ok(Selection::Eof);
                    };
                    match arrow {
                        KEY_ARROW_UP => self.move_selection(-1)?,
                        KEY_ARROW_DOWN => self.move_selection(1)?,
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    fn move_selection(&mut self, delta: isize) -> Result<()> {
        if self.options.is_empty() {
            return Ok(());
        }
        let len = self.options.len();
        self.current = (self.current + len).wrapping_add_signed(delta) % len;
        // Rewind over the option lines and repaint them in place.
        let rewind = CursorDir::Up.sequence(len);
        write_all(libc::STDOUT_FILENO, rewind.as_bytes())?;
        self.print_options()
    }

    fn print_options(&self) -> Result<()> {
        let mut rendered = Vec::new();
        for (index, option) in self.options.iter().enumerate() {
            if index == self.current {
                rendered.extend_from_slice(HIGHLIGHT);
                rendered.extend_from_slice(option.as_bytes());
                rendered.extend_from_slice(RESET_ATTRIBUTES);
            } else {
                rendered.extend_from_slice(option.as_bytes());
            }
            rendered.extend_from_slice(b"\r\n");
        }
        write_all(libc::STDOUT_FILENO, &rendered)?;
        Ok(())
    }

    /// Restores the screen and, if managed, the terminal mode. Safe to
    /// call more than once.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if self.alt_screen {
            let _ = write_all(libc::STDOUT_FILENO, ALT_SCREEN_EXIT);
        }
        if let Some(mut raw) = self.raw.take() {
            let _ = raw.deactivate();
        }
    }
}

impl Drop for Menu<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
