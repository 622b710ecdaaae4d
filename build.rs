//! Build script for lamco-pointer-queue
//!
//! Embeds build date, time and commit hash into the replay binary banner.

use std::process::Command;

/// Trimmed stdout of a successful command, `None` if it failed or printed nothing
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn main() {
    let stamp = command_output("date", &["+%Y-%m-%d %H:%M:%S"]);
    let (date, time) = match stamp.as_deref().and_then(|s| s.split_once(' ')) {
        Some((date, time)) => (date.to_string(), time.to_string()),
        None => ("unknown".to_string(), String::new()),
    };
    println!("cargo:rustc-env=BUILD_DATE={}", date);
    println!("cargo:rustc-env=BUILD_TIME={}", time);

    // Outside a git checkout (e.g. a packaged crate) the hash is unknown
    let git_hash = command_output("git", &["rev-parse", "--short", "HEAD"])
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_HASH={}", git_hash);

    println!("cargo:rerun-if-changed=.git/HEAD");
}
