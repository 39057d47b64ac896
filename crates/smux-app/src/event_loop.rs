//! The interactive core: one blocking poll loop over stdin and the
//! focused window's pty master.
//!
//! Ordinary stdin bytes are forwarded verbatim to the focused shell.
//! Ctrl-A (byte 0x01) arms a one-shot command prefix; the byte after
//! it selects a multiplexer action instead of reaching the shell.

use std::os::fd::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use smux_pty::io::{read_byte, read_retry, write_all};
use smux_pty::{Direction, MuxError, RawMode, Window, WindowRegistry};

use crate::escape::CLEAR_SCREEN;
use crate::menu::{Menu, MenuConfig, Selection};

/// Ctrl-A. Arms the command prefix.
pub const COMMAND_PREFIX: u8 = 0x01;

const CMD_LIST: u8 = b'"';
const CMD_CREATE: u8 = b'c';
const CMD_NEXT: u8 = b'n';
const CMD_PREVIOUS: u8 = b'N';

const OUTPUT_CHUNK: usize = 512;

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigwinch(_signal: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::SeqCst);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopState {
    Running,
    Terminated,
}

pub struct EventLoop {
    registry: WindowRegistry,
    shell: String,
    scrollback_bytes: usize,
    state: LoopState,
}

impl EventLoop {
    pub fn new(shell: String, scrollback_bytes: usize) -> Self {
        EventLoop {
            registry: WindowRegistry::new(),
            shell,
            scrollback_bytes,
            state: LoopState::Running,
        }
    }

    #[cfg(test)]
    fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// Runs until stdin closes or the last window exits. The terminal
    /// is raw for the whole run and restored before returning, even on
    /// error.
    pub fn run(&mut self) -> Result<()> {
        install_sigwinch_handler()?;
        let mut raw = RawMode::activate().context("entering raw mode")?;
        self.create_window().context("creating initial window")?;
        let outcome = self.pump();
        raw.deactivate().context("restoring terminal mode")?;
        outcome
    }

    fn pump(&mut self) -> Result<()> {
        let mut buf = [0u8; OUTPUT_CHUNK];
        while self.state == LoopState::Running {
            if SIGWINCH_RECEIVED.swap(false, Ordering::SeqCst) {
                self.forward_terminal_size();
            }
            let Some(window) = self.registry.current() else {
                break;
            };
            let master = window.master_fd();

            let mut fds = [
                libc::pollfd {
                    fd: libc::STDIN_FILENO,
                    events: libc::POLLIN,
                    revents: 0,
                },
                libc::pollfd {
                    fd: master,
                    events: libc::POLLIN,
                    revents: 0,
                },
            ];
            let res = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
            if res < 0 {
                let errno = Errno::last();
                if errno == Errno::EINTR {
                    continue;
                }
                return Err(MuxError::Syscall { op: "poll", errno }.into());
            }

            // Keyboard input wins when both sides are ready, so a
            // chatty window can never starve commands.
            if readable(fds[0].revents) {
                self.handle_stdin(libc::STDIN_FILENO, master)?;
            } else if dead(fds[0].revents) {
                self.state = LoopState::Terminated;
            } else if readable(fds[1].revents) {
                self.handle_master_output(master, &mut buf)?;
            } else if dead(fds[1].revents) {
                self.retire_current()?;
            }
        }
        Ok(())
    }

    fn handle_stdin(&mut self, input: RawFd, master: RawFd) -> Result<()> {
        match read_byte(input)? {
            None => self.state = LoopState::Terminated,
            Some(COMMAND_PREFIX) => match read_byte(input)? {
                None => self.state = LoopState::Terminated,
                Some(cmd) => self.handle_command(cmd)?,
            },
            Some(byte) => write_all(master, &[byte])?,
        }
        Ok(())
    }

    /// Dispatches the byte that followed the Ctrl-A prefix. Unknown
    /// bytes are swallowed rather than forwarded.
    fn handle_command(&mut self, cmd: u8) -> Result<()> {
        match cmd {
            CMD_LIST => self.choose_window(),
            CMD_CREATE => self.create_window(),
            CMD_NEXT => {
                self.registry.switch(Direction::Next)?;
                self.redraw()
            }
            CMD_PREVIOUS => {
                self.registry.switch(Direction::Previous)?;
                self.redraw()
            }
            _ => Ok(()),
        }
    }

    /// Creates a window, starts the shell in it, and focuses it.
    fn create_window(&mut self) -> Result<()> {
        let shell = self.shell.clone();
        let id = self.registry.create(self.scrollback_bytes)?;
        if let Some(window) = self.registry.current_mut() {
            window
                .attach_shell(&shell)
                .with_context(|| format!("starting {shell}"))?;
            let (cols, rows) = terminal_size();
            apply_window_size(window, cols, rows);
        }
        log::info!("created window {id} running {shell}");
        self.redraw()
    }

    /// Presents the window list and focuses whatever gets picked.
    fn choose_window(&mut self) -> Result<()> {
        if self.registry.is_empty() {
            return Ok(());
        }
        let labels = self.registry.labels();
        let mut menu = Menu::open(&labels, MenuConfig::default())?;
        let selection = menu.run()?;
        menu.close();
        match selection {
            Selection::Choice(index) => {
                self.registry.select(index)?;
                self.redraw()?;
            }
            Selection::Cancelled => self.redraw()?,
            // Stdin is already at end of input; the next loop pass reads
            // it and shuts down.
            Selection::Eof => {}
        }
        Ok(())
    }

    fn handle_master_output(&mut self, master: RawFd, buf: &mut [u8]) -> Result<()> {
        let n = read_retry(master, buf)?;
        if n == 0 {
            return self.retire_current();
        }
        if let Some(window) = self.registry.current_mut() {
            window.record_output(&buf[..n]);
        }
        write_all(libc::STDOUT_FILENO, &buf[..n])?;
        Ok(())
    }

    /// Drops the focused window after its shell exits. Focus moves to
    /// a neighbour; closing the last window ends the session.
    fn retire_current(&mut self) -> Result<()> {
        let mut window = self.registry.retire_current()?;
        let status = window.reap();
        log::info!("window {} exited with status {:?}", window.id(), status);
        if self.registry.is_empty() {
            self.state = LoopState::Terminated;
        } else {
            self.redraw()?;
        }
        Ok(())
    }

    /// Clears the screen and replays the focused window's scrollback.
    fn redraw(&mut self) -> Result<()> {
        write_all(libc::STDOUT_FILENO, CLEAR_SCREEN)?;
        let Some(window) = self.registry.current() else {
            return Ok(());
        };
        let mut snapshot = window.scrollback().clone();
        let mut chunk = [0u8; OUTPUT_CHUNK];
        loop {
            let n = snapshot.read(&mut chunk);
            if n == 0 {
                break;
            }
            write_all(libc::STDOUT_FILENO, &chunk[..n])?;
        }
        Ok(())
    }

    fn forward_terminal_size(&mut self) {
        let (cols, rows) = terminal_size();
        if let Some(window) = self.registry.current() {
            apply_window_size(window, cols, rows);
        }
    }
}

/// Propagate a terminal size to a window's pty. A failure leaves the pty
/// at its old size; worth a warning but not worth stopping the session.
fn apply_window_size(window: &Window, cols: u16, rows: u16) {
    if let Err(err) = window.resize(cols, rows) {
        log::warn!("window {} resize to {cols}x{rows} failed: {err}", window.id());
    }
}

fn readable(revents: libc::c_short) -> bool {
    revents & (libc::POLLIN | libc::POLLHUP) != 0
}

/// `POLLERR`/`POLLNVAL` without readable data: the descriptor can make no
/// further progress and gets the same treatment as end of input.
fn dead(revents: libc::c_short) -> bool {
    revents & (libc::POLLERR | libc::POLLNVAL) != 0
}

fn install_sigwinch_handler() -> Result<()> {
    // No SA_RESTART: poll must come back with EINTR so the loop can
    // pick up the new size.
    let action = SigAction::new(
        SigHandler::Handler(handle_sigwinch),
        SaFlags::empty(),
        SigSet::empty(),
    );
    unsafe { sigaction(Signal::SIGWINCH, &action) }.map_err(|errno| MuxError::Syscall {
        op: "sigaction",
        errno,
    })?;
    Ok(())
}

/// Current size of the controlling terminal, with a plain 80x24
/// fallback when stdout is not a tty.
fn terminal_size() -> (u16, u16) {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let res = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) };
    if res == 0 && size.ws_col > 0 && size.ws_row > 0 {
        (size.ws_col, size.ws_row)
    } else {
        (80, 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::fd::AsRawFd;

    #[test]
    fn test_create_command_grows_registry_and_moves_focus() {
        let mut event_loop = EventLoop::new("/bin/sh".to_string(), 1024);
        event_loop.handle_command(CMD_CREATE).unwrap();
        event_loop.handle_command(CMD_CREATE).unwrap();
        assert_eq!(event_loop.registry().len(), 2);
        assert_eq!(event_loop.registry().current_index(), Some(1));
    }

    #[test]
    fn test_next_and_previous_cycle_the_focus() {
        let mut event_loop = EventLoop::new("/bin/sh".to_string(), 1024);
        event_loop.handle_command(CMD_CREATE).unwrap();
        event_loop.handle_command(CMD_CREATE).unwrap();
        event_loop.handle_command(CMD_CREATE).unwrap();
        assert_eq!(event_loop.registry().current_index(), Some(2));
        event_loop.handle_command(CMD_NEXT).unwrap();
        assert_eq!(event_loop.registry().current_index(), Some(0));
        event_loop.handle_command(CMD_PREVIOUS).unwrap();
        assert_eq!(event_loop.registry().current_index(), Some(2));
    }

    #[test]
    fn test_unknown_command_byte_is_swallowed() {
        let mut event_loop = EventLoop::new("/bin/sh".to_string(), 1024);
        event_loop.handle_command(CMD_CREATE).unwrap();
        event_loop.handle_command(b'x').unwrap();
        assert_eq!(event_loop.registry().len(), 1);
        assert_eq!(event_loop.registry().current_index(), Some(0));
    }

    #[test]
    fn test_stdin_eof_terminates_the_loop() {
        let mut event_loop = EventLoop::new("/bin/sh".to_string(), 1024);
        event_loop.handle_command(CMD_CREATE).unwrap();
        let master = event_loop.registry().current().unwrap().master_fd();

        // A closed write end makes the read end report end of input
        // immediately, like a hung-up terminal.
        let (reader, writer) = std::io::pipe().expect("pipe");
        drop(writer);

        assert_eq!(event_loop.state, LoopState::Running);
        event_loop.handle_stdin(reader.as_raw_fd(), master).unwrap();
        assert_eq!(event_loop.state, LoopState::Terminated);
    }

    #[test]
    fn test_eof_after_prefix_terminates_the_loop() {
        let mut event_loop = EventLoop::new("/bin/sh".to_string(), 1024);
        event_loop.handle_command(CMD_CREATE).unwrap();
        let master = event_loop.registry().current().unwrap().master_fd();

        let (reader, mut writer) = std::io::pipe().expect("pipe");
        std::io::Write::write_all(&mut writer, &[COMMAND_PREFIX]).unwrap();
        drop(writer);

        event_loop.handle_stdin(reader.as_raw_fd(), master).unwrap();
        assert_eq!(event_loop.state, LoopState::Terminated);
    }

    #[test]
    fn test_error_only_revents_are_dead_not_readable() {
        assert!(readable(libc::POLLIN));
        assert!(readable(libc::POLLIN | libc::POLLHUP));
        assert!(readable(libc::POLLHUP | libc::POLLERR));
        assert!(!readable(libc::POLLERR));
        assert!(dead(libc::POLLERR));
        assert!(dead(libc::POLLNVAL));
        assert!(!dead(libc::POLLIN));
    }

    #[test]
    fn test_applying_terminal_size_does_not_tear_down_the_window() {
        let mut event_loop = EventLoop::new("/bin/sh".to_string(), 1024);
        event_loop.handle_command(CMD_CREATE).unwrap();
        let window = event_loop.registry().current().unwrap();
        apply_window_size(window, 132, 50);
        assert_eq!(event_loop.registry().len(), 1);
    }

    #[test]
    fn test_command_prefix_is_ctrl_a() {
        assert_eq!(COMMAND_PREFIX, 0x01);
    }
}
