//! Errors surfaced by the job-control kernel.
//!
//! The `Display` text of each command-level variant is exactly what the
//! shell prints for it, so the REPL can report errors with a plain
//! `println!("{e}")`.

use nix::errno::Errno;
use nix::sys::signal::Signal;
use thiserror::Error;
use tsh_types::JobId;

/// Result type for kernel operations.
pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    /// `fork` itself failed; only the current command is abandoned.
    #[error("fork error: {0}")]
    LaunchFailure(Errno),

    /// No free slot in the job table.
    #[error("Tried to create too many jobs")]
    RegistryFull,

    /// Another job already owns the foreground slot.
    #[error("job [{0}] already owns the foreground")]
    ForegroundOccupied(JobId),

    #[error("{command} command requires PID or %jobid argument")]
    MissingArgument { command: String },

    #[error("({0}): no such process")]
    NoSuchProcess(i32),

    #[error("%{0}: no such job")]
    NoSuchJob(JobId),

    #[error("{command}: argument must be a PID or %jobid")]
    InvalidArgument { command: String },

    /// SIGCONT could not be delivered; the job keeps its previous state.
    #[error("({pid}): cannot continue job: {errno}")]
    ContinueFailed { pid: i32, errno: Errno },

    /// An argument contained an interior NUL byte and cannot be passed to exec.
    #[error("{0}: invalid argument")]
    InvalidCommand(String),

    /// Installing a signal handler failed at startup.
    #[error("failed to install {0} handler: {1}")]
    HandlerInstall(Signal, Errno),

    /// Changing the thread signal mask failed.
    #[error("sigprocmask error: {0}")]
    SignalMask(Errno),

    /// The job table was used before `signals::init`.
    #[error("job table not initialised")]
    NotInitialized,

    #[error("job table already initialised")]
    AlreadyInitialized,

    /// A critical section was entered while one was already held.
    #[error("nested job table access")]
    NestedCriticalSection,
}

impl JobError {
    /// Whether the interpreter cannot keep job-control invariants after this.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            JobError::HandlerInstall(..)
                | JobError::SignalMask(_)
                | JobError::NotInitialized
                | JobError::AlreadyInitialized
                | JobError::NestedCriticalSection
        )
    }
}
