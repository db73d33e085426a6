//! Blocking until the foreground slot is vacated.

use nix::unistd::Pid;

use super::JobTable;
use crate::error::JobResult;
use crate::signals::Critical;

/// Whether `pid` still owns the foreground slot.
pub fn holds_foreground(table: &JobTable, pid: Pid) -> bool {
    table
        .find_by_pid(pid)
        .is_some_and(|job| job.state.is_foreground())
}

/// Block until the job led by `pid` is no longer running in the foreground.
///
/// Returns once it exited, was killed or was stopped. The table is re-read
/// after every wakeup; the wait itself is `sigsuspend`, so the loop costs one
/// iteration per delivered signal rather than a timer tick.
///
/// Must not be called while a [`Critical`] is held.
#[tracing::instrument(level = "debug")]
pub fn wait_for_foreground_clear(pid: Pid) -> JobResult<()> {
    let mut critical = Critical::enter()?;
    while holds_foreground(critical.jobs(), pid) {
        critical.wait_for_signal()?;
    }
    tracing::debug!("foreground slot clear");
    Ok(())
}
