use std::os::fd::RawFd;
use std::process::Child;

use smux_scrollback::ScrollbackBuffer;

use crate::error::MuxError;
use crate::pty::PtySession;

/// Unique identifier for a window, assigned at creation and never reused.
pub type WindowId = u64;

/// A multiplexer window: a pty session, the shell attached to it, and a
/// bounded scrollback of its recent output.
///
/// Windows are move-only; exactly one window owns a given pty master, and
/// the descriptor closes when the window is dropped or retired.
pub struct Window {
    id: WindowId,
    pty: PtySession,
    child: Option<Child>,
    program: String,
    scrollback: ScrollbackBuffer,
}

impl Window {
    /// Allocate a pty and a fresh scrollback for a new window.
    ///
    /// The shell is not started here; call [`Window::attach_shell`] once the
    /// window is registered.
    pub fn new(id: WindowId, scrollback_capacity: usize) -> Result<Self, MuxError> {
        let pty = PtySession::open()?;
        Ok(Self {
            id,
            pty,
            child: None,
            program: String::from("-"),
            scrollback: ScrollbackBuffer::new(scrollback_capacity),
        })
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    /// The pty master descriptor this window services.
    pub fn master_fd(&self) -> RawFd {
        self.pty.master_fd()
    }

    /// Spawn `program` as this window's shell, attached to the pty slave as
    /// its controlling terminal.
    pub fn attach_shell(&mut self, program: &str) -> Result<(), MuxError> {
        let child = self.pty.spawn(program)?;
        self.program = program.to_string();
        self.child = Some(child);
        Ok(())
    }

    /// Pid of the attached shell, if one has been spawned.
    pub fn child_pid(&self) -> Option<u32> {
        self.child.as_ref().map(|c| c.id())
    }

    /// Display label: window id plus the running program.
    pub fn label(&self) -> String {
        format!("window {} ({})", self.id, self.program)
    }

    /// Record output read from the master into the scrollback. May overwrite
    /// the oldest history when the buffer is full.
    pub fn record_output(&mut self, data: &[u8]) {
        self.scrollback.write(data);
    }

    /// The window's scrollback; clone it to replay without consuming.
    pub fn scrollback(&self) -> &ScrollbackBuffer {
        &self.scrollback
    }

    /// Forward a terminal size to the window's pty.
    pub fn resize(&self, cols: u16, rows: u16) -> Result<(), MuxError> {
        self.pty.resize(cols, rows)
    }

    /// Wait for the exited shell and return its exit code (128 + signal for
    /// signalled exits). `None` if no shell was ever attached or the wait
    /// itself failed.
    pub fn reap(&mut self) -> Option<i32> {
        use std::os::unix::process::ExitStatusExt;

        let mut child = self.child.take()?;
        match child.wait() {
            Ok(status) => {
                let code = status
                    .code()
                    .or_else(|| status.signal().map(|sig| 128 + sig))
                    .unwrap_or(-1);
                log::debug!("window {} child exited with {}", self.id, code);
                Some(code)
            }
            Err(err) => {
                log::warn!("window {} wait failed: {}", self.id, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{read_retry, write_all};
    use std::time::Duration;

    #[test]
    fn test_new_window_has_no_child() {
        let window = Window::new(1, 512).expect("window");
        assert_eq!(window.id(), 1);
        assert!(window.child_pid().is_none());
        assert!(window.master_fd() >= 0);
        assert_eq!(window.scrollback().capacity(), 512);
    }

    #[test]
    fn test_record_output_fills_scrollback() {
        let mut window = Window::new(1, 8).unwrap();
        window.record_output(b"0123456789");
        assert_eq!(window.scrollback().size(), 8);

        let mut snapshot = window.scrollback().clone();
        let mut out = [0u8; 8];
        assert_eq!(snapshot.read(&mut out), 8);
        assert_eq!(&out, b"23456789");
        // Replay must not consume the window's own history.
        assert_eq!(window.scrollback().size(), 8);
    }

    #[test]
    fn test_label_includes_id_and_program() {
        let window = Window::new(3, 64).unwrap();
        assert_eq!(window.label(), "window 3 (-)");
    }

    #[test]
    fn test_attach_and_reap_shell() {
        let mut window = Window::new(1, 512).unwrap();
        window.attach_shell("/bin/sh").expect("attach");
        assert!(window.child_pid().is_some());
        assert_eq!(window.label(), "window 1 (/bin/sh)");

        write_all(window.master_fd(), b"exit 3\n").unwrap();
        let mut buf = [0u8; 512];
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while std::time::Instant::now() < deadline {
            match read_retry(window.master_fd(), &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }

        assert_eq!(window.reap(), Some(3));
        assert!(window.child_pid().is_none());
    }
}
