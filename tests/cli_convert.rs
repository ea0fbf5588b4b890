//! Integration tests for the offline `layout` and `convert` commands.
//!
//! Every test points `--settings` at a path that does not exist so the
//! user's real settings file cannot leak into the results.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

fn cli() -> Command {
    Command::cargo_bin("danmaku-loader").expect("binary 'danmaku-loader' should be built")
}

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/comments.xml")
}

fn no_settings() -> PathBuf {
    std::env::temp_dir().join("danmaku-loader-cli-tests-no-such-settings.toml")
}

fn layout_json(args: &[&str]) -> serde_json::Value {
    let output = cli()
        .arg("layout")
        .args(args)
        .arg("--settings")
        .arg(no_settings())
        .output()
        .expect("run layout");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("layout prints JSON")
}

// ─── layout ──────────────────────────────────────────────────────────────────

#[test]
fn layout_720p_on_1080p() {
    let layout = layout_json(&["--width", "1280", "--height", "720", "--display", "1920x1080"]);
    assert_eq!(layout["width"], 1280);
    assert_eq!(layout["height"], 720);
    assert_eq!(layout["font_size"], 36);
    assert_eq!(layout["scroll_duration_secs"], 10);
    assert_eq!(layout["still_duration_secs"], 0);
    assert_eq!(layout["opacity"], 0.0);
}

#[test]
fn layout_clamps_tall_video() {
    let layout = layout_json(&["--width", "1920", "--height", "1200", "--display", "1920x1080"]);
    assert_eq!(layout["width"], 1728);
    assert_eq!(layout["height"], 1080);
}

#[test]
fn layout_small_video_uses_smallest_tier() {
    let layout = layout_json(&["--width", "640", "--height", "360"]);
    assert_eq!(layout["font_size"], 28);
    assert_eq!(layout["scroll_duration_secs"], 6);
}

#[test]
fn layout_flags_override_defaults() {
    let layout = layout_json(&[
        "--width",
        "1280",
        "--height",
        "720",
        "--font",
        "Noto Sans",
        "--font-size",
        "24",
        "--scroll-duration",
        "12",
        "--still-duration",
        "3",
        "--opacity",
        "80",
    ]);
    assert_eq!(layout["font_family"], "Noto Sans");
    assert_eq!(layout["font_size"], 24);
    assert_eq!(layout["scroll_duration_secs"], 12);
    assert_eq!(layout["still_duration_secs"], 3);
    assert_eq!(layout["opacity"], 0.8);
}

#[test]
fn layout_reads_settings_file() {
    let path = std::env::temp_dir().join(format!(
        "danmaku-loader-cli-settings-{}.toml",
        std::process::id()
    ));
    fs::write(&path, "[danmaku]\nfont_size = 30\nds = 6\nalpha = 50\n").unwrap();

    let output = cli()
        .args(["layout", "--width", "1280", "--height", "720", "--settings"])
        .arg(&path)
        .output()
        .unwrap();
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(layout["font_size"], 30);
    assert_eq!(layout["still_duration_secs"], 6);
    assert_eq!(layout["opacity"], 0.5);
}

#[test]
fn layout_zero_flag_falls_back_to_settings_file() {
    let path = std::env::temp_dir().join(format!(
        "danmaku-loader-cli-zero-{}.toml",
        std::process::id()
    ));
    fs::write(&path, "[danmaku]\nfont_size = 30\ndm = 12\n").unwrap();

    let output = cli()
        .args([
            "layout",
            "--width",
            "1280",
            "--height",
            "720",
            "--font-size",
            "0",
            "--scroll-duration",
            "0",
            "--settings",
        ])
        .arg(&path)
        .output()
        .unwrap();
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(layout["font_size"], 30);
    assert_eq!(layout["scroll_duration_secs"], 12);
}

#[test]
fn layout_zero_flag_without_settings_uses_width_tier() {
    let layout = layout_json(&["--width", "800", "--height", "450", "--font-size", "0"]);
    assert_eq!(layout["font_size"], 32);
}

#[test]
fn layout_help_describes_zero_as_no_override() {
    cli()
        .args(["layout", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 = no override"));
}

// ─── convert ─────────────────────────────────────────────────────────────────

#[test]
fn convert_fixture_to_stdout() {
    cli()
        .arg("convert")
        .arg(fixture())
        .args(["--width", "1280", "--height", "720", "--still-duration", "5"])
        .arg("--settings")
        .arg(no_settings())
        .assert()
        .success()
        .stdout(predicate::str::contains("[Script Info]"))
        .stdout(predicate::str::contains("PlayResX: 1280"))
        .stdout(predicate::str::contains("PlayResY: 720"))
        .stdout(predicate::str::contains("first scroll"))
        .stdout(predicate::str::contains("top red"))
        .stdout(predicate::str::contains("big blue \\{braces\\}"))
        .stdout(predicate::str::contains("skipped").not());
}

#[test]
fn convert_without_still_duration_hides_still_comments() {
    cli()
        .arg("convert")
        .arg(fixture())
        .args(["--width", "1280", "--height", "720"])
        .arg("--settings")
        .arg(no_settings())
        .assert()
        .success()
        .stdout(predicate::str::contains("first scroll"))
        .stdout(predicate::str::contains("top red").not())
        .stdout(predicate::str::contains("bottom green").not());
}

#[test]
fn convert_to_file() {
    let out = std::env::temp_dir().join(format!("danmaku-loader-cli-{}.ass", std::process::id()));

    cli()
        .arg("convert")
        .arg(fixture())
        .args(["--width", "1920", "--height", "1200", "--still-duration", "5", "-o"])
        .arg(&out)
        .arg("--settings")
        .arg(no_settings())
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved"));

    let content = fs::read_to_string(&out).unwrap();
    let _ = fs::remove_file(&out);
    assert!(content.contains("PlayResX: 1728"));
    assert!(content.contains("PlayResY: 1080"));
    assert_eq!(content.matches("Dialogue:").count(), 5);
}

#[test]
fn convert_missing_file_fails() {
    cli()
        .args(["convert", "/nonexistent/comments.xml", "--width", "1280", "--height", "720"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
