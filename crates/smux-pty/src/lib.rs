//! smux-pty: pseudo-terminal and window management for smux.
//!
//! This crate owns the OS-facing half of the multiplexer: allocating pty
//! pairs, attaching shells to them as their controlling terminal, toggling
//! the real terminal into raw mode, and tracking the set of windows.
//!
//! # Architecture
//!
//! - [`PtySession`] — pty master allocation and the controlling-terminal
//!   acquisition protocol for spawned shells.
//! - [`RawMode`] — scoped raw-mode guard for the real terminal.
//! - [`Window`] — a pty session, its shell process, and its scrollback.
//! - [`WindowRegistry`] — ordered windows plus the current-window cursor.
//! - [`io`] — retrying read/write helpers over raw descriptors.

pub mod error;
pub mod io;
pub mod pty;
pub mod raw;
pub mod registry;
pub mod window;

pub use error::MuxError;
pub use pty::PtySession;
pub use raw::RawMode;
pub use registry::{Direction, WindowRegistry};
pub use window::{Window, WindowId};
