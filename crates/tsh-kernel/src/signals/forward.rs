//! Ctrl-C / Ctrl-Z forwarding to the foreground job.
//!
//! The terminal delivers SIGINT and SIGTSTP to the shell's own process
//! group. Every job runs in a group of its own, so the shell passes the
//! signal on to the foreground job's whole group.

use nix::errno::Errno;
use nix::libc::c_int;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tsh_types::JobState;

use super::critical::handler_table;
use super::notice::Notice;
use crate::scheduler::JobTable;

/// Forward `signal` to the foreground job's process group via `send`.
///
/// No foreground job, or a group that vanished before the send (`ESRCH`),
/// makes this a no-op. A forwarded SIGTSTP also marks the job stopped and
/// returns the stop notice.
pub fn forward_to_foreground<F>(table: &mut JobTable, signal: Signal, send: F) -> Option<Notice>
where
    F: FnOnce(Pid, Signal) -> nix::Result<()>,
{
    let pid = table.foreground_pid()?;
    send(pid, signal).ok()?;

    if signal != Signal::SIGTSTP {
        return None;
    }
    let job = table.find_by_pid_mut(pid)?;
    job.state = JobState::Stopped;
    Some(Notice::stopped(job.jid, pid, signal))
}

fn forward(signal: Signal) {
    let saved_errno = Errno::last_raw();
    // SAFETY: installed by `signals::install` with all job-control signals masked.
    if let Some(table) = unsafe { handler_table() }
        && let Some(notice) = forward_to_foreground(table, signal, |pgrp, sig| killpg(pgrp, sig))
    {
        notice.emit();
    }
    Errno::set_raw(saved_errno);
}

pub(crate) extern "C" fn on_sigint(_signal: c_int) {
    forward(Signal::SIGINT);
}

pub(crate) extern "C" fn on_sigtstp(_signal: c_int) {
    forward(Signal::SIGTSTP);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn table_with_foreground(pid: i32) -> JobTable {
        let mut table = JobTable::default();
        table.add(Pid::from_raw(pid), JobState::Foreground, "sleep 100").unwrap();
        table
    }

    #[test]
    fn no_foreground_job_sends_nothing() {
        let mut table = JobTable::default();
        table.add(Pid::from_raw(5), JobState::Background, "sleep 100 &").unwrap();

        let sent = Cell::new(false);
        let notice = forward_to_foreground(&mut table, Signal::SIGINT, |_, _| {
            sent.set(true);
            Ok(())
        });
        assert!(notice.is_none());
        assert!(!sent.get());
    }

    #[test]
    fn interrupt_goes_to_foreground_group_and_leaves_state() {
        let mut table = table_with_foreground(42);
        let target = Cell::new(None);
        let notice = forward_to_foreground(&mut table, Signal::SIGINT, |pgrp, sig| {
            target.set(Some((pgrp, sig)));
            Ok(())
        });
        assert!(notice.is_none());
        assert_eq!(target.get(), Some((Pid::from_raw(42), Signal::SIGINT)));
        // Removal is the relay's job once the child actually dies.
        assert_eq!(table.foreground_pid(), Some(Pid::from_raw(42)));
    }

    #[test]
    fn suspend_marks_job_stopped_and_announces() {
        let mut table = table_with_foreground(42);
        let notice = forward_to_foreground(&mut table, Signal::SIGTSTP, |_, _| Ok(())).unwrap();
        assert_eq!(
            notice.as_str(),
            format!("Job [1] (42) stopped by signal {}\n", Signal::SIGTSTP as i32)
        );
        assert_eq!(
            table.find_by_pid(Pid::from_raw(42)).unwrap().state,
            JobState::Stopped
        );
        assert_eq!(table.foreground_pid(), None);
    }

    #[test]
    fn failed_send_changes_nothing() {
        let mut table = table_with_foreground(42);
        let notice = forward_to_foreground(&mut table, Signal::SIGTSTP, |_, _| Err(Errno::ESRCH));
        assert!(notice.is_none());
        assert_eq!(table.foreground_pid(), Some(Pid::from_raw(42)));
    }
}
