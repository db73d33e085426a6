//! Build script for tsh-repl.
//!
//! Stamps the binary with the commit and date it was built from, for
//! `tsh -V`. Setting `TSH_GIT_HASH` overrides the commit, which is how a
//! build from a source tarball (no repository to ask) gets a real one.

use std::env;
use std::path::Path;
use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-env-changed=TSH_GIT_HASH");

    let crate_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    watch_git_state(crate_dir);

    let git_hash = env::var("TSH_GIT_HASH")
        .ok()
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
        .or_else(|| git(crate_dir, &["rev-parse", "--short", "HEAD"]))
        .unwrap_or_else(|| "unknown".to_string());

    let build_date = chrono::Utc::now().format("%Y-%m-%d").to_string();

    println!("cargo::rustc-env=TSH_GIT_HASH={git_hash}");
    println!("cargo::rustc-env=TSH_BUILD_DATE={build_date}");
}

/// Run git in `dir` and return its trimmed stdout, if it succeeded.
fn git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Rebuild when HEAD moves: on checkout, and on commit to the current branch.
///
/// Git resolves the paths itself, so this works from any depth in the
/// repository and in linked worktrees. Nothing is watched outside a
/// repository; a watched path that does not exist would rerun every build.
fn watch_git_state(dir: &Path) {
    let mut refs = vec!["HEAD".to_string(), "packed-refs".to_string()];
    // Detached HEAD has no branch ref.
    refs.extend(git(dir, &["symbolic-ref", "-q", "HEAD"]));

    for name in refs {
        let Some(path) = git(dir, &["rev-parse", "--git-path", &name]) else {
            continue;
        };
        let path = dir.join(path);
        if path.exists() {
            println!("cargo::rerun-if-changed={}", path.display());
        }
    }
}
