use nix::errno::Errno;

/// Errors from pty, terminal, and window-registry operations.
///
/// System-call failures are fatal to the multiplexer: there is no recovery
/// path beyond restoring the terminal and exiting. Interrupted calls
/// (`EINTR`) never appear here; the helpers in [`crate::io`] retry them.
#[derive(Debug)]
pub enum MuxError {
    /// Allocating or unlocking a pseudo-terminal pair failed.
    PtyAllocation(Errno),
    /// A descriptor-level system call failed.
    Syscall { op: &'static str, errno: Errno },
    /// Querying or setting terminal attributes failed.
    TerminalControl { op: &'static str, errno: Errno },
    /// Spawning the shell process failed (including child-side setup).
    Spawn(std::io::Error),
    /// An operation that needs at least one window ran on an empty registry.
    EmptyRegistry,
    /// A window index outside the registry's bounds.
    OutOfRange { index: usize, len: usize },
}

impl std::fmt::Display for MuxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MuxError::PtyAllocation(errno) => write!(f, "pty allocation failed: {errno}"),
            MuxError::Syscall { op, errno } => write!(f, "{op}: {errno}"),
            MuxError::TerminalControl { op, errno } => write!(f, "{op}: {errno}"),
            MuxError::Spawn(err) => write!(f, "failed to spawn shell: {err}"),
            MuxError::EmptyRegistry => write!(f, "no windows in registry"),
            MuxError::OutOfRange { index, len } => {
                write!(f, "window index {index} out of range (len {len})")
            }
        }
    }
}

impl std::error::Error for MuxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MuxError::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MuxError {
    fn from(err: std::io::Error) -> Self {
        MuxError::Spawn(err)
    }
}
