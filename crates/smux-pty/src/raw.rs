use std::io;

use nix::sys::termios::{cfmakeraw, tcgetattr, tcsetattr, SetArg, Termios};

use crate::error::MuxError;

/// Scoped raw-mode toggle for the real terminal.
///
/// `activate` captures the current attributes of stdin, applies raw mode
/// (no echo, no canonical line buffering, no signal characters, no output
/// post-processing), and returns a guard. Dropping the guard restores the
/// saved attributes, so restoration runs on normal return, `?` propagation,
/// and panic unwinding alike.
///
/// Re-activating before deactivating would capture raw attributes as the
/// "original" state; hold at most one live guard per terminal.
pub struct RawMode {
    saved: Termios,
    restored: bool,
}

impl RawMode {
    /// Switch stdin's terminal into raw mode, saving the current attributes.
    pub fn activate() -> Result<Self, MuxError> {
        let stdin = io::stdin();
        let saved = tcgetattr(&stdin).map_err(|errno| MuxError::TerminalControl {
            op: "tcgetattr",
            errno,
        })?;

        let mut raw = saved.clone();
        cfmakeraw(&mut raw);
        tcsetattr(&stdin, SetArg::TCSANOW, &raw).map_err(|errno| MuxError::TerminalControl {
            op: "tcsetattr",
            errno,
        })?;

        Ok(Self {
            saved,
            restored: false,
        })
    }

    /// Restore the saved attributes. Idempotent: repeat calls are no-ops.
    pub fn deactivate(&mut self) -> Result<(), MuxError> {
        if self.restored {
            return Ok(());
        }
        tcsetattr(io::stdin(), SetArg::TCSANOW, &self.saved).map_err(|errno| {
            MuxError::TerminalControl {
                op: "tcsetattr",
                errno,
            }
        })?;
        self.restored = true;
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = self.deactivate();
    }
}
