//! SIGCHLD relay: reap every pending child and update the job table.

use nix::errno::Errno;
use nix::libc::c_int;
use nix::sys::wait::{WaitPidFlag, waitpid};
use nix::unistd::Pid;
use tsh_types::JobState;

use super::critical::handler_table;
use super::event::ChildEvent;
use super::notice::Notice;
use crate::scheduler::JobTable;

/// Apply one child event to the table, returning the notice to print.
///
/// Events for pids the table does not know (an abandoned launch, a job
/// already removed) are dropped silently.
pub fn apply(table: &mut JobTable, pid: Pid, event: ChildEvent) -> Option<Notice> {
    match event {
        ChildEvent::Exited(_) => {
            table.remove(pid);
            None
        }
        ChildEvent::Killed(signal) => {
            let jid = table.pid_to_jid(pid)?;
            table.remove(pid);
            Some(Notice::terminated(jid, pid, signal))
        }
        ChildEvent::Stopped(signal) => {
            let job = table.find_by_pid_mut(pid)?;
            // The SIGTSTP forwarder already recorded and announced this stop.
            if job.state == JobState::Stopped {
                return None;
            }
            job.state = JobState::Stopped;
            Some(Notice::stopped(job.jid, pid, signal))
        }
    }
}

/// Drain every pending status change without blocking.
///
/// Several exits can collapse into one SIGCHLD, so this loops until
/// `waitpid` reports nothing more (or no children at all). Returns the
/// number of events applied.
pub fn reap_pending(table: &mut JobTable) -> usize {
    let mut applied = 0;
    loop {
        match waitpid(
            Pid::from_raw(-1),
            Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED),
        ) {
            Ok(status) => {
                let Some((pid, event)) = ChildEvent::from_wait_status(status) else {
                    // StillAlive: children exist but none changed state.
                    break;
                };
                if let Some(notice) = apply(table, pid, event) {
                    notice.emit();
                }
                applied += 1;
            }
            Err(Errno::EINTR) => continue,
            // ECHILD: no children left to wait for.
            Err(_) => break,
        }
    }
    applied
}

pub(crate) extern "C" fn on_sigchld(_signal: c_int) {
    let saved_errno = Errno::last_raw();
    // SAFETY: installed by `signals::install` with all job-control signals masked.
    if let Some(table) = unsafe { handler_table() } {
        reap_pending(table);
    }
    Errno::set_raw(saved_errno);
}
