//! jobs: list live jobs.

use crate::error::JobResult;
use crate::scheduler::JobTable;
use crate::signals::Critical;

/// One `[jid] (pid) State command` line per job, in slot order.
pub fn listing(table: &JobTable) -> Vec<String> {
    table.list().map(|job| job.listing()).collect()
}

/// Print the job table.
///
/// Lines are written while signals are blocked, so no job can vanish
/// halfway through the listing.
pub fn run() -> JobResult<()> {
    let mut critical = Critical::enter()?;
    for line in listing(critical.jobs()) {
        println!("{line}");
    }
    Ok(())
}
