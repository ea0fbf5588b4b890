//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, and each subcommand
//! responds to `--help` with appropriate text.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `danmaku-loader` binary.
fn cli() -> Command {
    Command::cargo_bin("danmaku-loader").expect("binary 'danmaku-loader' should be built")
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: danmaku-loader"))
        .stdout(predicate::str::contains("load"))
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("layout"));
}

#[test]
fn version_flag_shows_semver() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^danmaku-loader \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error() {
    cli().assert().failure();
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn load_help_lists_layout_flags() {
    cli()
        .args(["load", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--width"))
        .stdout(predicate::str::contains("--height"))
        .stdout(predicate::str::contains("--display"))
        .stdout(predicate::str::contains("--timeout"));
}

#[test]
fn convert_help_lists_overrides() {
    cli()
        .args(["convert", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--font-size"))
        .stdout(predicate::str::contains("--scroll-duration"))
        .stdout(predicate::str::contains("--still-duration"))
        .stdout(predicate::str::contains("--opacity"));
}

// ─── Argument validation ─────────────────────────────────────────────────────

#[test]
fn zero_width_is_rejected() {
    cli()
        .args(["layout", "--width", "0", "--height", "720"])
        .assert()
        .failure();
}

#[test]
fn malformed_display_is_rejected() {
    cli()
        .args(["layout", "--width", "1280", "--height", "720", "--display", "big"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("WIDTHxHEIGHT"));
}

#[test]
fn load_rejects_invalid_url() {
    cli()
        .args(["load", "not a url", "--width", "1280", "--height", "720"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid URL"));
}
