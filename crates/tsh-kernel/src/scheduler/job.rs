//! The job table: a bounded, slot-ordered registry of live jobs.
//!
//! `JobTable` is plain data. Its mutators never block, print or allocate,
//! which is what lets the SIGCHLD handler call them directly. Main flow only
//! reaches the process-wide table through [`crate::signals::Critical`].

use nix::unistd::Pid;
use tsh_types::{CommandText, JobId, JobState, MAX_JID};

use crate::error::{JobError, JobResult};

/// Default number of job slots.
pub const DEFAULT_MAX_JOBS: usize = 16;

/// A tracked child process group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Leader pid; also the process group id.
    pub pid: Pid,
    pub jid: JobId,
    pub state: JobState,
    pub command: CommandText,
}

impl Job {
    /// One line of `jobs` output, without the trailing newline.
    pub fn listing(&self) -> String {
        format!("[{}] ({}) {} {}", self.jid, self.pid, self.state, self.command)
    }

    /// The `[jid] (pid) command` echo used for background launches and `bg`.
    pub fn echo(&self) -> String {
        format!("[{}] ({}) {}", self.jid, self.pid, self.command)
    }
}

/// Fixed-capacity job registry.
#[derive(Debug, Clone)]
pub struct JobTable {
    slots: Vec<Option<Job>>,
    /// Next job id to try.
    next_jid: u32,
}

impl JobTable {
    /// Create a table with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        // Keep every slot addressable by a distinct id.
        let capacity = capacity.clamp(1, (MAX_JID - 1) as usize);
        Self {
            slots: vec![None; capacity],
            next_jid: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn has_free_slot(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    /// Register a new job in the first free slot.
    ///
    /// Fails with [`JobError::RegistryFull`] when every slot is taken and
    /// with [`JobError::ForegroundOccupied`] when asked for a second
    /// foreground job.
    pub fn add(&mut self, pid: Pid, state: JobState, command: &str) -> JobResult<JobId> {
        if pid.as_raw() < 1 {
            return Err(JobError::NoSuchProcess(pid.as_raw()));
        }
        if state.is_foreground()
            && let Some(fg) = self.foreground()
        {
            return Err(JobError::ForegroundOccupied(fg.jid));
        }
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(JobError::RegistryFull)?;

        let jid = self.allocate_jid();
        self.slots[index] = Some(Job {
            pid,
            jid,
            state,
            command: CommandText::new(command),
        });
        Ok(jid)
    }

    /// Clear the slot owned by `pid`. Returns false if no such job.
    pub fn remove(&mut self, pid: Pid) -> bool {
        let Some(slot) = self
            .slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|job| job.pid == pid))
        else {
            return false;
        };
        *slot = None;
        self.next_jid = self.max_jid().map_or(1, |jid| wrap_jid(jid.0 + 1));
        true
    }

    pub fn find_by_pid(&self, pid: Pid) -> Option<&Job> {
        self.list().find(|job| job.pid == pid)
    }

    pub fn find_by_pid_mut(&mut self, pid: Pid) -> Option<&mut Job> {
        self.slots.iter_mut().flatten().find(|job| job.pid == pid)
    }

    pub fn find_by_jid(&self, jid: JobId) -> Option<&Job> {
        self.list().find(|job| job.jid == jid)
    }

    pub fn pid_to_jid(&self, pid: Pid) -> Option<JobId> {
        self.find_by_pid(pid).map(|job| job.jid)
    }

    /// The job currently owning the foreground slot, if any.
    pub fn foreground(&self) -> Option<&Job> {
        self.list().find(|job| job.state.is_foreground())
    }

    pub fn foreground_pid(&self) -> Option<Pid> {
        self.foreground().map(|job| job.pid)
    }

    /// Move the job led by `pid` to `state`.
    ///
    /// Refuses to hand the foreground to a job while a different job holds it.
    pub fn set_state(&mut self, pid: Pid, state: JobState) -> JobResult<()> {
        if state.is_foreground()
            && let Some(fg) = self.foreground().filter(|fg| fg.pid != pid)
        {
            return Err(JobError::ForegroundOccupied(fg.jid));
        }
        let job = self
            .find_by_pid_mut(pid)
            .ok_or(JobError::NoSuchProcess(pid.as_raw()))?;
        job.state = state;
        Ok(())
    }

    /// Occupied slots in slot order.
    pub fn list(&self) -> impl Iterator<Item = &Job> {
        self.slots.iter().flatten()
    }

    fn max_jid(&self) -> Option<JobId> {
        self.list().map(|job| job.jid).max()
    }

    fn is_jid_taken(&self, jid: u32) -> bool {
        self.list().any(|job| job.jid.0 == jid)
    }

    /// Next id at or after `next_jid` that no live job holds.
    ///
    /// Only called with a free slot available, so at most `capacity - 1`
    /// ids are taken and the search terminates.
    fn allocate_jid(&mut self) -> JobId {
        let mut candidate = self.next_jid;
        while self.is_jid_taken(candidate) {
            candidate = wrap_jid(candidate + 1);
        }
        self.next_jid = wrap_jid(candidate + 1);
        JobId(candidate)
    }

    #[cfg(test)]
    fn set_next_jid(&mut self, jid: u32) {
        self.next_jid = jid;
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_JOBS)
    }
}

fn wrap_jid(jid: u32) -> u32 {
    if jid > MAX_JID { 1 } else { jid }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: i32) -> Pid {
        Pid::from_raw(n)
    }

    fn assert_invariants(table: &JobTable) {
        let fg = table.list().filter(|j| j.state.is_foreground()).count();
        assert!(fg <= 1, "{fg} foreground jobs");

        let mut jids: Vec<_> = table.list().map(|j| j.jid).collect();
        let before = jids.len();
        jids.sort();
        jids.dedup();
        assert_eq!(jids.len(), before, "duplicate job ids");
    }

    #[test]
    fn first_background_job_gets_id_one() {
        let mut table = JobTable::default();
        let jid = table.add(pid(100), JobState::Background, "sleep 100 &").unwrap();
        assert_eq!(jid, JobId(1));

        let job = table.find_by_pid(pid(100)).unwrap();
        assert_eq!(job.state, JobState::Background);
        assert_eq!(job.listing(), "[1] (100) Running sleep 100 &");
        assert_eq!(job.echo(), "[1] (100) sleep 100 &");
    }

    #[test]
    fn ids_increase_while_jobs_are_live() {
        let mut table = JobTable::default();
        for n in 1..=5 {
            let jid = table.add(pid(100 + n), JobState::Background, "x").unwrap();
            assert_eq!(jid, JobId(n as u32));
        }
        assert_invariants(&table);
    }

    #[test]
    fn full_table_rejects_and_keeps_existing_jobs() {
        let mut table = JobTable::new(4);
        for n in 0..4 {
            table.add(pid(200 + n), JobState::Background, "x").unwrap();
        }
        assert!(!table.has_free_slot());

        let err = table.add(pid(300), JobState::Background, "y").unwrap_err();
        assert_eq!(err, JobError::RegistryFull);
        assert_eq!(table.len(), 4);
        assert!(table.find_by_pid(pid(300)).is_none());
        assert_invariants(&table);
    }

    #[test]
    fn second_foreground_job_is_refused() {
        let mut table = JobTable::default();
        let first = table.add(pid(10), JobState::Foreground, "a").unwrap();
        let err = table.add(pid(11), JobState::Foreground, "b").unwrap_err();
        assert_eq!(err, JobError::ForegroundOccupied(first));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn set_state_guards_the_foreground_slot() {
        let mut table = JobTable::default();
        table.add(pid(10), JobState::Foreground, "a").unwrap();
        table.add(pid(11), JobState::Stopped, "b").unwrap();

        assert!(matches!(
            table.set_state(pid(11), JobState::Foreground),
            Err(JobError::ForegroundOccupied(JobId(1)))
        ));
        // Re-asserting the current owner is fine.
        table.set_state(pid(10), JobState::Foreground).unwrap();

        table.set_state(pid(10), JobState::Stopped).unwrap();
        table.set_state(pid(11), JobState::Foreground).unwrap();
        assert_eq!(table.foreground_pid(), Some(pid(11)));
        assert_invariants(&table);
    }

    #[test]
    fn set_state_on_unknown_pid() {
        let mut table = JobTable::default();
        assert_eq!(
            table.set_state(pid(5), JobState::Stopped),
            Err(JobError::NoSuchProcess(5))
        );
    }

    #[test]
    fn remove_clears_slot_and_reuses_top_id() {
        let mut table = JobTable::default();
        table.add(pid(1), JobState::Background, "a").unwrap();
        table.add(pid(2), JobState::Background, "b").unwrap();
        assert!(table.remove(pid(2)));
        assert!(!table.remove(pid(2)));

        // Id 2 was freed and is the next one past the live maximum.
        assert_eq!(table.add(pid(3), JobState::Background, "c").unwrap(), JobId(2));

        // Freeing a lower id does not rewind below the live maximum.
        assert!(table.remove(pid(1)));
        assert_eq!(table.add(pid(4), JobState::Background, "d").unwrap(), JobId(3));
        assert_invariants(&table);
    }

    #[test]
    fn removing_last_job_restarts_at_one() {
        let mut table = JobTable::default();
        table.add(pid(1), JobState::Background, "a").unwrap();
        table.remove(pid(1));
        assert!(table.is_empty());
        assert_eq!(table.add(pid(2), JobState::Background, "b").unwrap(), JobId(1));
    }

    #[test]
    fn allocation_wraps_without_colliding() {
        let mut table = JobTable::new(4);
        table.set_next_jid(MAX_JID - 1);
        assert_eq!(table.add(pid(1), JobState::Background, "a").unwrap(), JobId(MAX_JID - 1));
        assert_eq!(table.add(pid(2), JobState::Background, "b").unwrap(), JobId(MAX_JID));
        assert_eq!(table.add(pid(3), JobState::Background, "c").unwrap(), JobId(1));

        // Force the allocator back onto ids that are still live.
        table.set_next_jid(MAX_JID);
        assert_eq!(table.add(pid(4), JobState::Background, "d").unwrap(), JobId(2));
        assert_invariants(&table);
    }

    #[test]
    fn lookups_by_pid_and_jid() {
        let mut table = JobTable::default();
        table.add(pid(40), JobState::Background, "a").unwrap();
        let jid = table.add(pid(41), JobState::Stopped, "b").unwrap();

        assert_eq!(table.find_by_jid(jid).unwrap().pid, pid(41));
        assert_eq!(table.pid_to_jid(pid(40)), Some(JobId(1)));
        assert!(table.find_by_jid(JobId(9)).is_none());
        assert!(table.find_by_pid(pid(99)).is_none());
        assert_eq!(table.foreground_pid(), None);
    }

    #[test]
    fn list_follows_slot_order() {
        let mut table = JobTable::default();
        table.add(pid(1), JobState::Background, "a").unwrap();
        table.add(pid(2), JobState::Background, "b").unwrap();
        table.add(pid(3), JobState::Background, "c").unwrap();
        table.remove(pid(1));
        // Slot 0 is reused, so the new job lists first.
        table.add(pid(4), JobState::Background, "d").unwrap();

        let pids: Vec<_> = table.list().map(|j| j.pid.as_raw()).collect();
        assert_eq!(pids, vec![4, 2, 3]);
    }

    #[test]
    fn non_positive_pid_is_rejected() {
        let mut table = JobTable::default();
        assert!(table.add(pid(0), JobState::Background, "a").is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn invariants_hold_under_mixed_operations() {
        let mut table = JobTable::new(6);
        let mut seed: u32 = 0x2545_f491;
        let mut next_pid = 1000;
        for _ in 0..2000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let live: Vec<Pid> = table.list().map(|j| j.pid).collect();
            match seed % 4 {
                0 => {
                    next_pid += 1;
                    let state = match (seed >> 8) % 3 {
                        0 => JobState::Foreground,
                        1 => JobState::Background,
                        _ => JobState::Stopped,
                    };
                    let _ = table.add(pid(next_pid), state, "job");
                }
                1 if !live.is_empty() => {
                    table.remove(live[(seed >> 8) as usize % live.len()]);
                }
                2 if !live.is_empty() => {
                    let target = live[(seed >> 8) as usize % live.len()];
                    let _ = table.set_state(target, JobState::Foreground);
                }
                _ if !live.is_empty() => {
                    let target = live[(seed >> 8) as usize % live.len()];
                    let _ = table.set_state(target, JobState::Stopped);
                }
                _ => {}
            }
            assert_invariants(&table);
            assert!(table.len() <= table.capacity());
        }
    }
}
