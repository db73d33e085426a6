//! The process-wide job table and the critical section guarding it.
//!
//! Main flow and the signal handlers share one `JobTable`. There is no lock:
//! a handler that spun on a lock held by the code it interrupted would
//! deadlock. Instead main flow blocks SIGCHLD, SIGINT and SIGTSTP for as
//! long as it holds a [`Critical`], and the handlers are installed with the
//! same three signals in their masks, so no two accessors ever overlap.

use std::cell::UnsafeCell;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering, compiler_fence};

use nix::sys::signal::{SigSet, SigmaskHow, Signal, sigprocmask};

use crate::error::{JobError, JobResult};
use crate::scheduler::JobTable;

struct SharedTable(UnsafeCell<JobTable>);

// SAFETY: tsh runs its interpreter on a single thread. Every access goes
// through `Critical` (signals masked) or a handler (other handlers masked).
unsafe impl Sync for SharedTable {}

static TABLE: OnceLock<SharedTable> = OnceLock::new();
static ENTERED: AtomicBool = AtomicBool::new(false);

/// Create the process-wide job table. Must run before handlers are installed.
pub fn init_table(capacity: usize) -> JobResult<()> {
    TABLE
        .set(SharedTable(UnsafeCell::new(JobTable::new(capacity))))
        .map_err(|_| JobError::AlreadyInitialized)
}

/// The signals whose handlers touch the job table.
pub fn job_control_signals() -> SigSet {
    let mut set = SigSet::empty();
    set.add(Signal::SIGCHLD);
    set.add(Signal::SIGINT);
    set.add(Signal::SIGTSTP);
    set
}

/// Scoped suppression of job-control signals.
///
/// While a `Critical` is alive the handlers cannot run, so the table it
/// lends out can be read and mutated in several steps without a handler
/// observing a half-finished update. Dropping it restores the previous
/// signal mask, on error paths too.
pub struct Critical {
    saved: SigSet,
    table: &'static SharedTable,
}

impl Critical {
    /// Block job-control signals and take exclusive access to the table.
    ///
    /// Fails with [`JobError::NestedCriticalSection`] if one is already held:
    /// two guards would hand out aliasing `&mut JobTable`s.
    pub fn enter() -> JobResult<Self> {
        let table = TABLE.get().ok_or(JobError::NotInitialized)?;
        if ENTERED.swap(true, Ordering::Acquire) {
            return Err(JobError::NestedCriticalSection);
        }

        let mut saved = SigSet::empty();
        if let Err(e) = sigprocmask(
            SigmaskHow::SIG_BLOCK,
            Some(&job_control_signals()),
            Some(&mut saved),
        ) {
            ENTERED.store(false, Ordering::Release);
            return Err(JobError::SignalMask(e));
        }
        compiler_fence(Ordering::SeqCst);
        Ok(Self { saved, table })
    }

    /// The job table. The borrow ends before the guard can wait for a signal,
    /// so lookups can never be carried across a handler run.
    pub fn jobs(&mut self) -> &mut JobTable {
        // SAFETY: handlers are masked and `ENTERED` rules out a second guard.
        unsafe { &mut *self.table.0.get() }
    }

    /// Sleep until a signal is delivered, with the pre-guard mask in force.
    ///
    /// This is `sigsuspend(2)`: unblocking and sleeping happen atomically, so
    /// a SIGCHLD that arrives between the caller's last check and this call
    /// is not lost. Handlers have run by the time this returns.
    pub fn wait_for_signal(&mut self) -> JobResult<()> {
        self.saved.suspend().map_err(JobError::SignalMask)?;
        compiler_fence(Ordering::SeqCst);
        Ok(())
    }

    /// The signal mask that was in force before the guard was entered.
    pub fn saved_mask(&self) -> &SigSet {
        &self.saved
    }
}

impl Drop for Critical {
    fn drop(&mut self) {
        compiler_fence(Ordering::SeqCst);
        ENTERED.store(false, Ordering::Release);
        // Restoring a mask we just read back cannot fail.
        let _ = sigprocmask(SigmaskHow::SIG_SETMASK, Some(&self.saved), None);
    }
}

/// The job table as seen from inside a signal handler.
///
/// Returns `None` before [`init_table`].
///
/// # Safety
///
/// Only call from a handler installed by [`crate::signals::install`], whose
/// mask blocks every job-control signal, and do not hold the reference past
/// the handler's return.
pub(crate) unsafe fn handler_table() -> Option<&'static mut JobTable> {
    compiler_fence(Ordering::SeqCst);
    // SAFETY: main flow only touches the table with these signals blocked,
    // so it cannot be mid-access while this handler runs.
    TABLE.get().map(|shared| unsafe { &mut *shared.0.get() })
}
