//! smux-scrollback: bounded output history for smux windows.
//!
//! Provides [`ScrollbackBuffer`], a fixed-capacity circular byte queue with
//! overwrite-oldest-on-full semantics. Each window records its recent output
//! here so the screen can be replayed instantly on window switch.

pub mod buffer;

pub use buffer::ScrollbackBuffer;
