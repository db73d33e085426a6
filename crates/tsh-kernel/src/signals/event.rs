//! Child status changes as seen by job control.

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

/// What happened to a child, stripped of raw `waitpid` encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildEvent {
    /// Exited normally with the given status code.
    Exited(i32),
    /// Terminated by a signal.
    Killed(Signal),
    /// Stopped by a job-control signal.
    Stopped(Signal),
}

impl ChildEvent {
    /// Classify a `waitpid` result.
    ///
    /// Statuses job control does not act on (continued, ptrace stops,
    /// "still alive") yield `None`.
    pub fn from_wait_status(status: WaitStatus) -> Option<(Pid, ChildEvent)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((pid, ChildEvent::Exited(code))),
            WaitStatus::Signaled(pid, signal, _core_dumped) => Some((pid, ChildEvent::Killed(signal))),
            WaitStatus::Stopped(pid, signal) => Some((pid, ChildEvent::Stopped(signal))),
            _ => None,
        }
    }
}
