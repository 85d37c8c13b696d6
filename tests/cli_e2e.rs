//! End-to-end CLI tests for chatsift.
//!
//! These tests run the actual binary against archives written to a temp dir
//! and check exit status, console output and the files produced.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::{TempDir, tempdir};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

// ============================================================================
// Test Fixtures
// ============================================================================

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

/// Creates a temporary directory with archives for every scenario.
fn setup_fixtures() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");

    let chat = "[1/15/24, 10:30:00 AM] Alice: Good morning everyone!
[1/15/24, 10:31:00 AM] Bob: good morning! love this group 😍
[1/15/24, 10:32:00 AM] Alice: PTT-20240115-WA0001.opus (file attached) (0:04)
[1/15/24, 10:33:00 AM] Charlie: ugh, running late
1/15/24, 10:34 AM - Bob left";
    write_zip(
        &dir.path().join("chat.zip"),
        &[
            ("_chat.txt", chat.as_bytes()),
            ("PTT-20240115-WA0001.opus", b"not-audio"),
        ],
    );

    write_zip(&dir.path().join("no_transcript.zip"), &[("IMG-1.jpg", b"jpeg")]);
    fs::write(dir.path().join("not_a_zip.zip"), "plain text").unwrap();

    dir
}

fn chatsift() -> Command {
    Command::cargo_bin("chatsift").unwrap()
}

// ============================================================================
// Basic functionality
// ============================================================================

#[test]
fn test_import_writes_output_files() {
    let dir = setup_fixtures();
    let out = dir.path().join("out");

    chatsift()
        .arg(dir.path().join("chat.zip"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Done!"))
        .stdout(predicate::str::contains("Messages:    5"))
        .stdout(predicate::str::contains("Voice notes: 1"));

    let messages = fs::read_to_string(out.join("messages.jsonl")).unwrap();
    assert_eq!(messages.lines().count(), 5);
    assert!(messages.contains("\"sender\":\"Charlie\""));

    let voice = fs::read_to_string(out.join("voice_notes.jsonl")).unwrap();
    assert!(voice.contains("\"duration_ms\":4000"));

    assert!(out.join("phrases.jsonl").exists());
    assert!(out.join("analytics.json").exists());
}

#[test]
fn test_progress_on_stderr() {
    let dir = setup_fixtures();

    chatsift()
        .arg(dir.path().join("chat.zip"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Validating archive"))
        .stderr(predicate::str::contains("[100%] Completed"));
}

#[test]
fn test_quiet_suppresses_progress() {
    let dir = setup_fixtures();

    chatsift()
        .arg(dir.path().join("chat.zip"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .arg("--quiet")
        .assert()
        .success()
        .stderr(predicate::str::contains("Validating archive").not());
}

#[test]
fn test_classify_voice_flag() {
    let dir = setup_fixtures();
    let out = dir.path().join("out");

    chatsift()
        .arg(dir.path().join("chat.zip"))
        .arg("-o")
        .arg(&out)
        .arg("--classify-voice")
        .assert()
        .success()
        .stdout(predicate::str::contains("emotion tagging"));

    let voice = fs::read_to_string(out.join("voice_notes.jsonl")).unwrap();
    assert!(voice.contains("\"emotion\""));
}

#[test]
fn test_max_phrases_flag() {
    let dir = setup_fixtures();
    let out = dir.path().join("out");

    chatsift()
        .arg(dir.path().join("chat.zip"))
        .arg("-o")
        .arg(&out)
        .args(["--max-phrases", "2"])
        .assert()
        .success();

    let phrases = fs::read_to_string(out.join("phrases.jsonl")).unwrap();
    assert!(phrases.lines().count() <= 2);
}

#[test]
fn test_work_dir_is_cleaned() {
    let dir = setup_fixtures();
    let work = dir.path().join("work");

    chatsift()
        .arg(dir.path().join("chat.zip"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .arg("--work-dir")
        .arg(&work)
        .assert()
        .success();

    assert_eq!(fs::read_dir(&work).unwrap().count(), 0);
}

// ============================================================================
// Error handling
// ============================================================================

#[test]
fn test_not_a_zip_fails() {
    let dir = setup_fixtures();

    chatsift()
        .arg(dir.path().join("not_a_zip.zip"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not a ZIP archive"));
}

#[test]
fn test_missing_transcript_fails() {
    let dir = setup_fixtures();

    chatsift()
        .arg(dir.path().join("no_transcript.zip"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("_chat.txt"));
}

#[test]
fn test_missing_archive_fails() {
    let dir = setup_fixtures();

    chatsift()
        .arg(dir.path().join("nope.zip"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open"));
}

#[test]
fn test_no_arguments_shows_usage() {
    chatsift()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_help() {
    chatsift()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--work-dir"))
        .stdout(predicate::str::contains("EXAMPLES"));
}
