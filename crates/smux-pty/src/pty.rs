use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::pty::{grantpt, posix_openpt, ptsname_r, unlockpt, PtyMaster};

use crate::error::MuxError;

/// An allocated pseudo-terminal pair, held by its master descriptor.
///
/// Allocation opens an unnamed master, grants access to the companion slave
/// device, and unlocks it for opening. The slave is never opened here: the
/// spawned shell opens it itself, which is what makes the slave its
/// controlling terminal (see [`PtySession::spawn`]).
pub struct PtySession {
    master: PtyMaster,
    slave_path: PathBuf,
}

impl PtySession {
    /// Allocate a new pty pair and resolve the slave device's path.
    pub fn open() -> Result<Self, MuxError> {
        let master = posix_openpt(OFlag::O_RDWR).map_err(MuxError::PtyAllocation)?;
        grantpt(&master).map_err(MuxError::PtyAllocation)?;
        unlockpt(&master).map_err(MuxError::PtyAllocation)?;
        let slave_path = PathBuf::from(ptsname_r(&master).map_err(MuxError::PtyAllocation)?);

        Ok(Self { master, slave_path })
    }

    /// The master descriptor. Valid for the session's entire lifetime; the
    /// descriptor closes when the session drops.
    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    /// Filesystem path of the slave device.
    pub fn slave_path(&self) -> &Path {
        &self.slave_path
    }

    /// Spawn `program` attached to this pty's slave side.
    ///
    /// Between fork and exec the child starts a new session (dropping any
    /// inherited controlling terminal), opens the slave path — the first
    /// terminal opened by a session leader becomes its controlling
    /// terminal — duplicates it onto stdin/stdout/stderr, and closes the
    /// spare descriptors. Any failing step aborts the exec and surfaces
    /// here as [`MuxError::Spawn`]; the child never runs without a
    /// controlling terminal.
    pub fn spawn(&self, program: &str) -> Result<Child, MuxError> {
        let path = CString::new(self.slave_path.as_os_str().as_bytes()).map_err(|_| {
            MuxError::Spawn(io::Error::new(
                io::ErrorKind::InvalidInput,
                "slave path contains an interior NUL",
            ))
        })?;
        let master_fd = self.master.as_raw_fd();

        let mut cmd = Command::new(program);
        unsafe {
            cmd.pre_exec(move || {
                if libc::setsid() == -1 {
                    return Err(io::Error::last_os_error());
                }
                let slave = libc::open(path.as_ptr(), libc::O_RDWR);
                if slave == -1 {
                    return Err(io::Error::last_os_error());
                }
                for fd in 0..=2 {
                    if libc::dup2(slave, fd) == -1 {
                        return Err(io::Error::last_os_error());
                    }
                }
                if slave > 2 {
                    libc::close(slave);
                }
                libc::close(master_fd);
                Ok(())
            });
        }

        let child = cmd.spawn().map_err(MuxError::Spawn)?;
        log::debug!(
            "spawned {} (pid {}) on {}",
            program,
            child.id(),
            self.slave_path.display()
        );
        Ok(child)
    }

    /// Set the pty's window size.
    pub fn resize(&self, cols: u16, rows: u16) -> Result<(), MuxError> {
        let ws = libc::winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        let res = unsafe { libc::ioctl(self.master.as_raw_fd(), libc::TIOCSWINSZ, &ws) };
        if res == -1 {
            return Err(MuxError::Syscall {
                op: "ioctl(TIOCSWINSZ)",
                errno: Errno::last(),
            });
        }
        Ok(())
    }
}
