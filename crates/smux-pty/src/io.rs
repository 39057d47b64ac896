//! Retrying read/write helpers over raw descriptors.
//!
//! `write(2)` may process only part of a request and either call may be
//! interrupted by a signal; these helpers resume until the request completes
//! or a real error occurs. `EINTR` is always retried, never surfaced.

use std::os::fd::RawFd;

use nix::errno::Errno;

use crate::error::MuxError;

fn raw_read(fd: RawFd, buf: &mut [u8]) -> Result<usize, Errno> {
    let res = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
    if res < 0 {
        Err(Errno::last())
    } else {
        Ok(res as usize)
    }
}

fn raw_write(fd: RawFd, buf: &[u8]) -> Result<usize, Errno> {
    let res = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
    if res < 0 {
        Err(Errno::last())
    } else {
        Ok(res as usize)
    }
}

/// Write all of `data` to `fd`, resuming short writes and retrying on
/// `EINTR`/`EAGAIN`.
pub fn write_all(fd: RawFd, data: &[u8]) -> Result<(), MuxError> {
    let mut written = 0;
    while written < data.len() {
        match raw_write(fd, &data[written..]) {
            Ok(n) => written += n,
            Err(Errno::EINTR) | Err(Errno::EAGAIN) => continue,
            Err(errno) => return Err(MuxError::Syscall { op: "write", errno }),
        }
    }
    Ok(())
}

/// Read into `buf`, retrying on `EINTR`. Returns 0 at end of input.
///
/// A pty master reports `EIO` once its slave side is fully closed; that is
/// folded into the end-of-input case.
pub fn read_retry(fd: RawFd, buf: &mut [u8]) -> Result<usize, MuxError> {
    loop {
        match raw_read(fd, buf) {
            Ok(n) => return Ok(n),
            Err(Errno::EINTR) => continue,
            Err(Errno::EIO) => return Ok(0),
            Err(errno) => return Err(MuxError::Syscall { op: "read", errno }),
        }
    }
}

/// Read a single byte from `fd`; `None` means end of input.
pub fn read_byte(fd: RawFd) -> Result<Option<u8>, MuxError> {
    let mut byte = [0u8; 1];
    match read_retry(fd, &mut byte)? {
        0 => Ok(None),
        _ => Ok(Some(byte[0])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::os::fd::AsRawFd;

    #[test]
    fn test_write_all_through_pipe() {
        let (mut reader, writer) = std::io::pipe().expect("pipe");
        write_all(writer.as_raw_fd(), b"across the pipe").unwrap();
        drop(writer);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"across the pipe");
    }

    #[test]
    fn test_read_byte_reports_eof() {
        let (reader, writer) = std::io::pipe().expect("pipe");
        write_all(writer.as_raw_fd(), b"x").unwrap();
        drop(writer);

        assert_eq!(read_byte(reader.as_raw_fd()).unwrap(), Some(b'x'));
        assert_eq!(read_byte(reader.as_raw_fd()).unwrap(), None);
    }
}
