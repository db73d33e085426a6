//! Job identification and state types.

/// Largest job id the allocator hands out before wrapping back to 1.
pub const MAX_JID: u32 = 1 << 16;

/// Shell-assigned identifier for a job, referenced as `%N` by `fg`/`bg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u32);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of an occupied job slot.
///
/// Empty slots are `None` in the job table and have no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    /// Running and owning the foreground slot.
    Foreground,
    /// Running in the background.
    Background,
    /// Stopped by a job-control signal (e.g., Ctrl-Z / SIGTSTP).
    Stopped,
}

impl JobState {
    pub fn is_foreground(self) -> bool {
        self == JobState::Foreground
    }
}

/// Renders the label used by `jobs`.
impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Foreground => write!(f, "Foreground"),
            JobState::Background => write!(f, "Running"),
            JobState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// How a freshly launched command should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    #[default]
    Foreground,
    Background,
}

impl LaunchMode {
    /// The state a job launched in this mode starts in.
    pub fn initial_state(self) -> JobState {
        match self {
            LaunchMode::Foreground => JobState::Foreground,
            LaunchMode::Background => JobState::Background,
        }
    }
}
