//! Pure data types for tsh: job ids, job states and command text.
//!
//! This crate is a leaf dependency with no OS calls and no I/O, so the
//! parser, the job-control kernel and any embedder can share these types
//! without pulling in `nix`.

pub mod command;
pub mod job;

pub use command::*;
pub use job::*;
