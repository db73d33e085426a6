//! Shell configuration.

use std::path::PathBuf;

use crate::scheduler::DEFAULT_MAX_JOBS;

/// Prompt printed before each line when prompting is on.
pub const DEFAULT_PROMPT: &str = "tsh> ";

/// Configuration for a [`crate::Shell`] and the loop that drives it.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Number of job slots.
    pub max_jobs: usize,

    /// Prompt text.
    pub prompt: String,

    /// Whether to print the prompt.
    ///
    /// Scripted drivers turn this off (`-p`) so the output holds only what
    /// the jobs and the shell print.
    pub emit_prompt: bool,

    /// Emit extra diagnostics (`-v`).
    pub verbose: bool,

    /// Line-editor history file. `None` keeps history in memory only.
    pub history: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_jobs: DEFAULT_MAX_JOBS,
            prompt: DEFAULT_PROMPT.to_string(),
            emit_prompt: true,
            verbose: false,
            history: None,
        }
    }
}

impl ShellConfig {
    /// Config for scripted use: no prompt, no history.
    pub fn scripted() -> Self {
        Self {
            emit_prompt: false,
            ..Self::default()
        }
    }

    /// Set the number of job slots.
    pub fn with_max_jobs(mut self, max_jobs: usize) -> Self {
        self.max_jobs = max_jobs;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_emit_prompt(mut self, emit: bool) -> Self {
        self.emit_prompt = emit;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Persist line-editor history to `path`.
    pub fn with_history(mut self, path: PathBuf) -> Self {
        self.history = Some(path);
        self
    }
}
