//! Builtin commands.
//!
//! Builtins run inside the shell process and never become jobs.

pub mod bgfg;
pub mod jobs;

pub use bgfg::{JobRef, Resume, resume_job};

/// The commands the shell handles itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Quit,
    Jobs,
    Bg,
    Fg,
}

impl Builtin {
    /// Look up a builtin by command name.
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "quit" => Some(Builtin::Quit),
            "jobs" => Some(Builtin::Jobs),
            "bg" => Some(Builtin::Bg),
            "fg" => Some(Builtin::Fg),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Quit => "quit",
            Builtin::Jobs => "jobs",
            Builtin::Bg => "bg",
            Builtin::Fg => "fg",
        }
    }
}
