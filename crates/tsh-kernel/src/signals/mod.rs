//! Signal handling for job control.
//!
//! - **critical**: the process-wide job table and the masking guard that
//!   serialises main flow against the handlers
//! - **relay**: SIGCHLD, reaps children and applies exits/stops
//! - **forward**: SIGINT/SIGTSTP, passes keystroke signals to the foreground job
//! - **notice**: allocation-free output usable from handlers
//!
//! Handlers never log through `tracing`; they only touch the job table,
//! call `waitpid`/`killpg` and write notices.

mod critical;
mod event;
mod forward;
mod notice;
mod relay;

pub use critical::{Critical, init_table, job_control_signals};
pub use event::ChildEvent;
pub use forward::forward_to_foreground;
pub use notice::Notice;
pub use relay::{apply, reap_pending};

use nix::libc::c_int;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

use crate::error::{JobError, JobResult};

/// Create the job table and install every handler.
///
/// Failure here is fatal to the shell: without the handlers no job-control
/// invariant holds.
pub fn init(max_jobs: usize) -> JobResult<()> {
    init_table(max_jobs)?;
    install()
}

/// Install the SIGCHLD, SIGINT, SIGTSTP and SIGQUIT handlers.
pub fn install() -> JobResult<()> {
    let mask = job_control_signals();
    install_handler(Signal::SIGCHLD, relay::on_sigchld, mask)?;
    install_handler(Signal::SIGINT, forward::on_sigint, mask)?;
    install_handler(Signal::SIGTSTP, forward::on_sigtstp, mask)?;
    install_handler(Signal::SIGQUIT, on_sigquit, SigSet::empty())?;
    tracing::debug!("job-control handlers installed");
    Ok(())
}

fn install_handler(signal: Signal, handler: extern "C" fn(c_int), mask: SigSet) -> JobResult<()> {
    let action = SigAction::new(SigHandler::Handler(handler), SaFlags::SA_RESTART, mask);
    // SAFETY: every handler here restricts itself to async-signal-safe work.
    unsafe { sigaction(signal, &action) }
        .map(drop)
        .map_err(|e| JobError::HandlerInstall(signal, e))
}

/// Clean way for a driver to stop the shell.
extern "C" fn on_sigquit(_signal: c_int) {
    Notice::line(format_args!("Terminating after receipt of SIGQUIT signal")).emit();
    // SAFETY: `_exit` is async-signal-safe; no destructors run.
    unsafe { nix::libc::_exit(1) }
}
