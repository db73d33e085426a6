//! The Shell: one evaluation step of the tsh read/eval loop.
//!
//! The Shell owns nothing but its configuration. The job table is
//! process-wide state, created once by [`Shell::new`] together with the
//! signal handlers that maintain it.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                          Shell                             │
//! │  line ──▶ parse_line ──▶ Builtin? ──yes──▶ quit/jobs/bg/fg │
//! │                             │ no                           │
//! │                             ▼                              │
//! │                 launch ──▶ (fg) wait_for_foreground_clear  │
//! └────────────────────────────────────────────────────────────┘
//! ```

use tsh_types::LaunchMode;

use crate::builtin::{self, Builtin, Resume};
use crate::config::ShellConfig;
use crate::error::JobResult;
use crate::parser::parse_line;
use crate::scheduler::{launch, wait_for_foreground_clear};
use crate::signals::{self, Critical};

/// What the loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A job-control shell.
#[derive(Debug)]
pub struct Shell {
    config: ShellConfig,
}

impl Shell {
    /// Create the job table and install the signal handlers.
    ///
    /// At most one shell may exist per process; a second call fails with
    /// [`crate::JobError::AlreadyInitialized`].
    pub fn new(config: ShellConfig) -> JobResult<Self> {
        signals::init(config.max_jobs)?;
        tracing::debug!(max_jobs = config.max_jobs, "shell initialized");
        Ok(Self { config })
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Evaluate one input line.
    ///
    /// Command-level failures come back as errors for the caller to print;
    /// the shell itself stays usable afterwards. Check
    /// [`crate::JobError::is_fatal`] before continuing.
    pub fn eval(&self, line: &str) -> JobResult<Flow> {
        let Some(command) = parse_line(line) else {
            return Ok(Flow::Continue);
        };

        match Builtin::lookup(command.name()) {
            Some(Builtin::Quit) => return Ok(Flow::Exit),
            Some(Builtin::Jobs) => builtin::jobs::run()?,
            Some(Builtin::Bg) => builtin::bgfg::run(Resume::Background, command.args())?,
            Some(Builtin::Fg) => builtin::bgfg::run(Resume::Foreground, command.args())?,
            None => {
                let launched = launch(&command, self.config.verbose)?;
                if launched.mode == LaunchMode::Foreground {
                    wait_for_foreground_clear(launched.pid)?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Current `jobs` lines, in slot order.
    pub fn list_jobs(&self) -> JobResult<Vec<String>> {
        let mut critical = Critical::enter()?;
        Ok(builtin::jobs::listing(critical.jobs()))
    }
}
