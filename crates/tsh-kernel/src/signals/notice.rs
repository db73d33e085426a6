//! Async-signal-safe user notices.
//!
//! Signal handlers and a freshly forked child cannot use `println!`: the
//! stdout lock may be held by the code they interrupted. A `Notice` is
//! formatted into a stack buffer through `core::fmt` and written to fd 1
//! with raw `write(2)` calls.

use std::fmt;
use std::os::fd::BorrowedFd;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tsh_types::{JobId, MAX_LINE};

const NOTICE_CAPACITY: usize = MAX_LINE + 128;

/// A single line of output, built without allocating.
pub struct Notice {
    buf: [u8; NOTICE_CAPACITY],
    len: usize,
}

impl Notice {
    pub const fn new() -> Self {
        Self {
            buf: [0; NOTICE_CAPACITY],
            len: 0,
        }
    }

    /// `Job [<jid>] (<pid>) terminated by signal <n>`
    pub fn terminated(jid: JobId, pid: Pid, signal: Signal) -> Self {
        Self::line(format_args!(
            "Job [{jid}] ({pid}) terminated by signal {}",
            signal as i32
        ))
    }

    /// `Job [<jid>] (<pid>) stopped by signal <n>`
    pub fn stopped(jid: JobId, pid: Pid, signal: Signal) -> Self {
        Self::line(format_args!(
            "Job [{jid}] ({pid}) stopped by signal {}",
            signal as i32
        ))
    }

    /// `<name>: Command not found`
    pub fn not_found(name: &str) -> Self {
        Self::line(format_args!("{name}: Command not found"))
    }

    pub fn line(args: fmt::Arguments<'_>) -> Self {
        let mut notice = Self::new();
        // Overflow truncates rather than failing, so the result is ignorable.
        let _ = fmt::Write::write_fmt(&mut notice, args);
        let _ = fmt::Write::write_str(&mut notice, "\n");
        notice
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    /// Write the notice to stdout, retrying on `EINTR` and short writes.
    pub fn emit(&self) {
        // SAFETY: fd 1 is never closed by the shell.
        let stdout = unsafe { BorrowedFd::borrow_raw(nix::libc::STDOUT_FILENO) };
        let mut rest = &self.buf[..self.len];
        while !rest.is_empty() {
            match nix::unistd::write(stdout, rest) {
                Ok(0) => break,
                Ok(n) => rest = &rest[n..],
                Err(Errno::EINTR) => continue,
                Err(_) => break,
            }
        }
    }
}

impl Default for Notice {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for Notice {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = NOTICE_CAPACITY - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

impl fmt::Debug for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Notice").field(&self.as_str()).finish()
    }
}
