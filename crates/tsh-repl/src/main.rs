//! tsh CLI entry point.
//!
//! Usage:
//!   tsh            # Interactive shell
//!   tsh -p         # No prompt; read commands from stdin (for drivers)
//!   tsh -v         # Report each added job; diagnostics on stderr

use std::env;
use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tsh_kernel::ShellConfig;
use tsh_repl::{Repl, default_history_path};

/// What the command line asked for.
#[derive(Debug, Default)]
struct Options {
    help: bool,
    version: bool,
    verbose: bool,
    no_prompt: bool,
}

fn main() -> ExitCode {
    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(unknown) => {
            eprintln!("Unknown option: {unknown}");
            print_help();
            return ExitCode::FAILURE;
        }
    };

    if options.help {
        print_help();
        return ExitCode::SUCCESS;
    }
    if options.version {
        println!(
            "tsh {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("TSH_GIT_HASH"),
            env!("TSH_BUILD_DATE")
        );
        return ExitCode::SUCCESS;
    }

    init_tracing(options.verbose);

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

/// Accepts grouped flags (`-vp`) the way `getopt` does.
fn parse_args(args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    for arg in args {
        match arg.as_str() {
            "--help" => options.help = true,
            "--version" => options.version = true,
            flags if flags.starts_with('-') && flags.len() > 1 && !flags.starts_with("--") => {
                for flag in flags[1..].chars() {
                    match flag {
                        'h' => options.help = true,
                        'v' => options.verbose = true,
                        'p' => options.no_prompt = true,
                        'V' => options.version = true,
                        _ => return Err(format!("-{flag}")),
                    }
                }
            }
            _ => return Err(arg),
        }
    }
    Ok(options)
}

/// Logs go to stderr so they never interleave with job output on stdout.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(options: &Options) -> Result<()> {
    let mut config = ShellConfig::default()
        .with_emit_prompt(!options.no_prompt)
        .with_verbose(options.verbose);
    if !options.no_prompt
        && let Some(path) = default_history_path()
    {
        config = config.with_history(path);
    }

    let repl = Repl::new(config)?;
    repl.run()
}

fn print_help() {
    println!(
        r#"tsh, a tiny job-control shell, v{}

Usage:
  tsh [-hvpV]

Options:
  -h, --help       Show this help
  -v               Report each added job; diagnostics to stderr
  -p               Do not emit a command prompt
  -V, --version    Show version

Built-in commands:
  quit             Exit the shell
  jobs             List running and stopped jobs
  bg <job>         Resume <job> in the background
  fg <job>         Resume <job> in the foreground

<job> is a process id or %jobid. A trailing & runs a command in the
background.
"#,
        env!("CARGO_PKG_VERSION")
    );
}
