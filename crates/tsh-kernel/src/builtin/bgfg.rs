//! bg / fg: resume a job in the background or the foreground.

use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tsh_types::{JobId, JobState};

use crate::error::{JobError, JobResult};
use crate::scheduler::{JobTable, wait_for_foreground_clear};
use crate::signals::Critical;

/// Which of the two commands is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Background,
    Foreground,
}

impl Resume {
    pub fn name(self) -> &'static str {
        match self {
            Resume::Background => "bg",
            Resume::Foreground => "fg",
        }
    }

    fn target_state(self) -> JobState {
        match self {
            Resume::Background => JobState::Background,
            Resume::Foreground => JobState::Foreground,
        }
    }
}

/// A job reference as typed: `1234` or `%2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobRef {
    Pid(Pid),
    Job(JobId),
}

impl JobRef {
    /// Parse the first argument of `command`.
    pub fn parse(command: &str, arg: Option<&str>) -> JobResult<Self> {
        let Some(arg) = arg else {
            return Err(JobError::MissingArgument {
                command: command.to_string(),
            });
        };
        let invalid = || JobError::InvalidArgument {
            command: command.to_string(),
        };

        if let Some(jid) = arg.strip_prefix('%') {
            return parse_decimal(jid)
                .and_then(|n| u32::try_from(n).ok())
                .map(|n| JobRef::Job(JobId(n)))
                .ok_or_else(invalid);
        }
        if arg.starts_with(|c: char| c.is_ascii_digit()) {
            return parse_decimal(arg)
                .and_then(|n| i32::try_from(n).ok())
                .map(|n| JobRef::Pid(Pid::from_raw(n)))
                .ok_or_else(invalid);
        }
        Err(invalid())
    }

    /// Look the reference up in `table`.
    pub fn resolve(self, table: &JobTable) -> JobResult<Pid> {
        match self {
            JobRef::Pid(pid) => table
                .find_by_pid(pid)
                .map(|job| job.pid)
                .ok_or(JobError::NoSuchProcess(pid.as_raw())),
            JobRef::Job(jid) => table
                .find_by_jid(jid)
                .map(|job| job.pid)
                .ok_or(JobError::NoSuchJob(jid)),
        }
    }
}

fn parse_decimal(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Run `bg`/`fg` with the given arguments (not including the command name).
///
/// `fg` returns only once the resumed job exits, dies or stops again.
#[tracing::instrument(level = "debug", skip(args), fields(command = resume.name()))]
pub fn run(resume: Resume, args: &[String]) -> JobResult<()> {
    let target = JobRef::parse(resume.name(), args.first().map(String::as_str))?;

    let pid = {
        let mut critical = Critical::enter()?;
        let table = critical.jobs();
        let pid = target.resolve(table)?;

        resume_job(table, pid, resume.target_state(), |pgrp, sig| killpg(pgrp, sig))?;
        if resume == Resume::Background
            && let Some(job) = table.find_by_pid(pid)
        {
            println!("{}", job.echo());
        }
        pid
    };

    if resume == Resume::Foreground {
        wait_for_foreground_clear(pid)?;
    }
    Ok(())
}

/// Move the job led by `pid` to `state`, then SIGCONT its whole group via
/// `send`.
///
/// The state changes first so a job that stops again at once is reported
/// against its new state. A group that already exited is not an error: the
/// relay removes the job once the pending SIGCHLD is delivered. Any other
/// delivery failure puts the previous state back.
pub fn resume_job<F>(table: &mut JobTable, pid: Pid, state: JobState, send: F) -> JobResult<()>
where
    F: FnOnce(Pid, Signal) -> nix::Result<()>,
{
    let previous = table
        .find_by_pid(pid)
        .map(|job| job.state)
        .ok_or(JobError::NoSuchProcess(pid.as_raw()))?;
    table.set_state(pid, state)?;

    match send(pid, Signal::SIGCONT) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => {
            tracing::warn!(pid = %pid, error = %errno, "failed to continue job");
            table.set_state(pid, previous)?;
            Err(JobError::ContinueFailed {
                pid: pid.as_raw(),
                errno,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("%1", JobRef::Job(JobId(1)))]
    #[case("%42", JobRef::Job(JobId(42)))]
    #[case("1234", JobRef::Pid(Pid::from_raw(1234)))]
    #[case("0", JobRef::Pid(Pid::from_raw(0)))]
    fn parses_valid_references(#[case] arg: &str, #[case] expected: JobRef) {
        assert_eq!(JobRef::parse("fg", Some(arg)).unwrap(), expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("%")]
    #[case("%abc")]
    #[case("%-1")]
    #[case("12x")]
    #[case("-5")]
    #[case("99999999999")]
    fn rejects_malformed_references(#[case] arg: &str) {
        let err = JobRef::parse("bg", Some(arg)).unwrap_err();
        assert_eq!(err.to_string(), "bg: argument must be a PID or %jobid");
    }

    #[test]
    fn missing_argument() {
        let err = JobRef::parse("fg", None).unwrap_err();
        assert_eq!(err.to_string(), "fg command requires PID or %jobid argument");
    }

    #[test]
    fn resolves_against_table() {
        let mut table = JobTable::default();
        table.add(Pid::from_raw(500), JobState::Stopped, "sleep 100").unwrap();

        assert_eq!(JobRef::Job(JobId(1)).resolve(&table).unwrap(), Pid::from_raw(500));
        assert_eq!(JobRef::Pid(Pid::from_raw(500)).resolve(&table).unwrap(), Pid::from_raw(500));
    }

    #[test]
    fn unknown_references_leave_table_untouched() {
        let mut table = JobTable::default();
        table.add(Pid::from_raw(500), JobState::Stopped, "sleep 100").unwrap();
        let before: Vec<_> = table.list().cloned().collect();

        let err = JobRef::Job(JobId(7)).resolve(&table).unwrap_err();
        assert_eq!(err.to_string(), "%7: no such job");
        let err = JobRef::Pid(Pid::from_raw(501)).resolve(&table).unwrap_err();
        assert_eq!(err.to_string(), "(501): no such process");

        let after: Vec<_> = table.list().cloned().collect();
        assert_eq!(before, after);
    }

    fn stopped_job() -> JobTable {
        let mut table = JobTable::default();
        table.add(Pid::from_raw(500), JobState::Stopped, "sleep 100").unwrap();
        table
    }

    #[rstest]
    #[case(JobState::Background)]
    #[case(JobState::Foreground)]
    fn resume_sends_sigcont_to_the_group(#[case] state: JobState) {
        let mut table = stopped_job();
        let mut sent = None;

        resume_job(&mut table, Pid::from_raw(500), state, |pgrp, sig| {
            sent = Some((pgrp, sig));
            Ok(())
        })
        .unwrap();

        assert_eq!(sent, Some((Pid::from_raw(500), Signal::SIGCONT)));
        assert_eq!(table.find_by_pid(Pid::from_raw(500)).unwrap().state, state);
    }

    #[test]
    fn resume_of_an_exited_group_keeps_the_new_state() {
        let mut table = stopped_job();

        resume_job(&mut table, Pid::from_raw(500), JobState::Foreground, |_, _| {
            Err(Errno::ESRCH)
        })
        .unwrap();

        assert_eq!(table.foreground_pid(), Some(Pid::from_raw(500)));
    }

    #[rstest]
    #[case(JobState::Background)]
    #[case(JobState::Foreground)]
    fn failed_sigcont_restores_the_previous_state(#[case] state: JobState) {
        let mut table = stopped_job();

        let err = resume_job(&mut table, Pid::from_raw(500), state, |_, _| Err(Errno::EPERM))
            .unwrap_err();

        assert_eq!(
            err,
            JobError::ContinueFailed {
                pid: 500,
                errno: Errno::EPERM
            }
        );
        assert_eq!(table.find_by_pid(Pid::from_raw(500)).unwrap().state, JobState::Stopped);
        assert_eq!(table.foreground_pid(), None);
    }

    #[test]
    fn resume_refuses_a_second_foreground_job_without_signalling() {
        let mut table = stopped_job();
        table.add(Pid::from_raw(600), JobState::Foreground, "sleep 200").unwrap();

        let err = resume_job(&mut table, Pid::from_raw(500), JobState::Foreground, |_, _| {
            panic!("no signal may be sent")
        })
        .unwrap_err();

        assert!(matches!(err, JobError::ForegroundOccupied(_)));
        assert_eq!(table.find_by_pid(Pid::from_raw(500)).unwrap().state, JobState::Stopped);
    }

    #[test]
    fn resume_targets() {
        assert_eq!(Resume::Background.target_state(), JobState::Background);
        assert_eq!(Resume::Foreground.target_state(), JobState::Foreground);
        assert_eq!(Resume::Foreground.name(), "fg");
    }
}
