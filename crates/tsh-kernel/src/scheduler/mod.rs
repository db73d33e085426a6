//! Scheduler module for tsh: launching jobs and tracking them.
//!
//! This module provides:
//! - **Job table**: bounded registry of live jobs, slot ordered.
//! - **Launcher**: fork + new process group + exec, registered atomically
//!   with respect to SIGCHLD.
//! - **Foreground wait**: blocks until the foreground job exits, dies or stops.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  fork/exec  ┌──────────────┐  SIGCHLD   ┌─────────────┐
//! │ launch()     │────────────▶│ child (pgrp) │───────────▶│ relay       │
//! │ (Critical)   │             └──────────────┘            │ (handler)   │
//! └──────┬───────┘                                         └──────┬──────┘
//!        │ add()                                    remove()/stop │
//!        ▼                                                        ▼
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                             JobTable                                 │
//! │  slots: [Option<Job>; N]   at most one Foreground                    │
//! └──────────────────────────────────────────────────────────────────────┘
//!        ▲
//!        │ re-read after every sigsuspend wakeup
//! ┌──────┴────────────────────┐
//! │ wait_for_foreground_clear │
//! └───────────────────────────┘
//! ```

mod foreground;
mod job;
mod launch;

pub use foreground::{holds_foreground, wait_for_foreground_clear};
pub use job::{DEFAULT_MAX_JOBS, Job, JobTable};
pub use launch::{Launched, NOT_FOUND_STATUS, launch};
