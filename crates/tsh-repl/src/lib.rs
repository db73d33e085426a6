//! tsh REPL: the read/eval loop around the job-control kernel.
//!
//! Two input paths:
//! - interactive: `rustyline` line editing with persistent history
//! - scripted (`-p`, or stdin not a terminal): plain buffered stdin, which is
//!   what test drivers pipe commands into
//!
//! Command errors are printed to stdout and the loop carries on. Only the
//! kernel's fatal errors end the session early.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use tsh_kernel::{Flow, Shell, ShellConfig};

/// A running shell plus the loop that feeds it.
#[derive(Debug)]
pub struct Repl {
    shell: Shell,
}

impl Repl {
    /// Initialize job control for this process.
    pub fn new(config: ShellConfig) -> Result<Self> {
        let shell = Shell::new(config).context("Failed to initialize job control")?;
        Ok(Self { shell })
    }

    /// Evaluate one line, reporting command errors on stdout.
    pub fn process_line(&self, line: &str) -> Result<Flow> {
        match self.shell.eval(line) {
            Ok(flow) => Ok(flow),
            Err(e) if e.is_fatal() => Err(e).context("Job control failed"),
            Err(e) => {
                tracing::debug!(error = ?e, "command failed");
                println!("{e}");
                Ok(Flow::Continue)
            }
        }
    }

    /// Run until `quit` or end of input.
    pub fn run(&self) -> Result<()> {
        let config = self.shell.config();
        if config.emit_prompt && io::stdin().is_terminal() {
            self.run_interactive()
        } else {
            self.run_plain()
        }
    }

    fn run_interactive(&self) -> Result<()> {
        let mut rl: Editor<(), DefaultHistory> =
            Editor::new().context("Failed to create editor")?;
        let history_path = self.shell.config().history.clone();
        load_history(&mut rl, &history_path);

        let prompt = self.shell.config().prompt.clone();
        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty()
                        && let Err(e) = rl.add_history_entry(line.as_str())
                    {
                        tracing::warn!("Failed to add history entry: {}", e);
                    }
                    if self.process_line(&line)? == Flow::Exit {
                        break;
                    }
                }
                // Ctrl-C at the prompt only discards the line being edited.
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    save_history(&mut rl, &history_path);
                    return Err(e).context("Failed to read command line");
                }
            }
        }

        save_history(&mut rl, &history_path);
        Ok(())
    }

    fn run_plain(&self) -> Result<()> {
        let config = self.shell.config();
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut line = String::new();

        loop {
            if config.emit_prompt {
                print!("{}", config.prompt);
                io::stdout().flush().context("Failed to write prompt")?;
            }

            line.clear();
            let read = input
                .read_line(&mut line)
                .context("Failed to read command line")?;
            if read == 0 {
                break;
            }
            if self.process_line(&line)? == Flow::Exit {
                break;
            }
        }
        Ok(())
    }
}

/// Default history location, under the user's data directory.
pub fn default_history_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.data_dir().join("tsh").join("history.txt"))
}

fn load_history(rl: &mut Editor<(), DefaultHistory>, history_path: &Option<PathBuf>) {
    let Some(path) = history_path else {
        return;
    };
    if let Err(e) = rl.load_history(path) {
        // A missing file is the normal first-run case.
        let is_not_found = matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound);
        if !is_not_found {
            tracing::warn!("Failed to load history: {}", e);
        }
    }
}

fn save_history(rl: &mut Editor<(), DefaultHistory>, history_path: &Option<PathBuf>) {
    let Some(path) = history_path else {
        return;
    };
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        tracing::warn!("Failed to create history directory: {}", e);
    }
    if let Err(e) = rl.save_history(path) {
        tracing::warn!("Failed to save history: {}", e);
    }
}
