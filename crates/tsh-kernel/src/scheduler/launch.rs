//! Launching external commands as jobs.

use std::ffi::CString;

use nix::sys::signal::{
    SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal, killpg, sigaction, sigprocmask,
};
use nix::unistd::{ForkResult, Pid, execvp, fork, setpgid};
use tsh_types::{JobId, LaunchMode, ParsedCommand};

use crate::error::{JobError, JobResult};
use crate::signals::{Critical, Notice};

/// Exit status of a child whose program could not be executed.
pub const NOT_FOUND_STATUS: i32 = 127;

/// Signals reset to their default disposition in every child.
const CHILD_DEFAULTS: [Signal; 5] = [
    Signal::SIGCHLD,
    Signal::SIGINT,
    Signal::SIGTSTP,
    Signal::SIGQUIT,
    Signal::SIGPIPE,
];

/// A job that was forked and registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Launched {
    pub pid: Pid,
    pub jid: JobId,
    pub mode: LaunchMode,
}

/// Fork `command` into a new process group and register it as a job.
///
/// Job-control signals stay blocked from before the fork until the job is
/// in the table, so a child that exits instantly is still reaped against a
/// known job. Background launches echo `[jid] (pid) command` before the
/// signals are released. With `verbose` set every launch also reports
/// `Added job [jid] pid command`. Waiting for a foreground launch is the
/// caller's business.
#[tracing::instrument(level = "debug", skip(command), fields(command = %command.name(), background = command.is_background()))]
pub fn launch(command: &ParsedCommand, verbose: bool) -> JobResult<Launched> {
    // Everything the child needs is prepared before fork.
    let argv = command
        .argv()
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| JobError::InvalidCommand(command.name().to_string()))?;
    let mode = command.mode();

    let mut critical = Critical::enter()?;
    // Refuse before forking: an unregistered child would be an orphan job.
    if !critical.jobs().has_free_slot() {
        return Err(JobError::RegistryFull);
    }

    // SAFETY: the interpreter is single threaded, and the child only calls
    // async-signal-safe functions before exec or `_exit`.
    match unsafe { fork() }.map_err(JobError::LaunchFailure)? {
        ForkResult::Child => exec_child(&argv, command.name(), critical.saved_mask()),
        ForkResult::Parent { child } => {
            // Both sides set the group so neither order of running loses it.
            // The child may already have exec'd (EACCES) or exited (ESRCH).
            if let Err(e) = setpgid(child, child) {
                tracing::trace!(pid = %child, error = %e, "parent setpgid");
            }

            let jid = match critical.jobs().add(child, mode.initial_state(), command.text()) {
                Ok(jid) => jid,
                Err(e) => {
                    // Never leave an untracked job behind; the relay reaps it.
                    let _ = killpg(child, Signal::SIGKILL);
                    return Err(e);
                }
            };
            tracing::debug!(%jid, pid = %child, command = %command.text(), "added job");

            if verbose {
                println!("Added job [{}] {} {}", jid, child, command.text());
            }
            if mode == LaunchMode::Background {
                println!("[{}] ({}) {}", jid, child, command.text());
            }
            Ok(Launched { pid: child, jid, mode })
        }
    }
}

/// Child side of [`launch`]. Never returns.
fn exec_child(argv: &[CString], name: &str, mask: &SigSet) -> ! {
    // Own group first, so a Ctrl-C aimed at the shell's group never reaches us.
    let _ = setpgid(Pid::from_raw(0), Pid::from_raw(0));
    // The shell's handlers must not run in the child once signals are
    // unblocked. SIGPIPE is ignored by the Rust runtime, and ignored
    // dispositions survive exec.
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    for signal in CHILD_DEFAULTS {
        // SAFETY: restoring the default disposition installs no handler code.
        let _ = unsafe { sigaction(signal, &default) };
    }
    let _ = sigprocmask(SigmaskHow::SIG_SETMASK, Some(mask), None);
    let _ = execvp(&argv[0], argv);

    Notice::not_found(name).emit();
    // SAFETY: `_exit` skips the parent's atexit handlers and stdio buffers,
    // which belong to the shell rather than to this child.
    unsafe { nix::libc::_exit(NOT_FOUND_STATUS) }
}
