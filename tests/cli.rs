//! Integration tests for top-level CLI behavior.
//!
//! None of these reach a tracker: each one fails or exits before the
//! service context is built.

use std::process::Command;

fn run_bugmirror(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_bugmirror");
    Command::new(bin)
        .args(args)
        .env_remove("BUGMIRROR_RECORD")
        .env_remove("BUGMIRROR_REPO")
        .env_remove("BUGMIRROR_BUG_TRACKER")
        .output()
        .expect("failed to run bugmirror binary")
}

#[test]
fn help_lists_subcommands() {
    let output = run_bugmirror(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("sync"));
    assert!(stdout.contains("list"));
}

#[test]
fn sync_help_shows_options() {
    let output = run_bugmirror(&["sync", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("--dry-run"));
    assert!(stdout.contains("--limit"));
    assert!(stdout.contains("--ui-project"));
}

#[test]
fn version_prints_to_stdout() {
    let output = run_bugmirror(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_fails() {
    let output = run_bugmirror(&["nonsense"]);
    assert!(!output.status.success());
}

#[test]
fn malformed_repo_fails_before_network() {
    let output = run_bugmirror(&["sync", "--repo", "maas-ui"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("owner/name"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn empty_tag_fails_before_network() {
    let output = run_bugmirror(&["list", "--tag", ""]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("--tag"), "stderr: {stderr}");
}
