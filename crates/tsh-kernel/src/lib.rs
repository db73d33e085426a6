//! tsh-kernel: the job-control core of tsh.
//!
//! This crate provides:
//!
//! - **Parser**: splits a command line into words and a launch mode
//! - **Scheduler**: the job table, the launcher and the foreground wait
//! - **Signals**: SIGCHLD relay, SIGINT/SIGTSTP forwarding and the critical
//!   section that keeps them consistent with the main flow
//! - **Builtins**: `quit`, `jobs`, `bg` and `fg`
//! - **Shell**: one read/eval step tying the above together

pub mod builtin;
pub mod config;
pub mod error;
pub mod kernel;
pub mod parser;
pub mod scheduler;
pub mod signals;

pub use config::{DEFAULT_PROMPT, ShellConfig};
pub use error::{JobError, JobResult};
pub use kernel::{Flow, Shell};
pub use parser::parse_line;
pub use scheduler::{DEFAULT_MAX_JOBS, Job, JobTable};
