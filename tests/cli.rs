//! CLI behavior that needs no running services: argument validation,
//! config loading, and the guards that short-circuit before any network
//! call.
//!
//! Every invocation runs from a temp directory with `GEMINI_API_KEY`
//! scrubbed, so a developer's real key or `.env` file cannot leak in.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn chai_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("chai");
    path
}

fn run_chai(
    dir: &Path,
    config: Option<&Path>,
    key: Option<&str>,
    args: &[&str],
) -> (String, String, bool) {
    let binary = chai_binary();
    let mut cmd = Command::new(&binary);
    cmd.current_dir(dir).env_remove("GEMINI_API_KEY");
    if let Some(key) = key {
        cmd.env("GEMINI_API_KEY", key);
    }
    if let Some(config) = config {
        cmd.arg("--config").arg(config);
    }
    let output = cmd
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run chai binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn run_chai_with_stdin(
    dir: &Path,
    key: Option<&str>,
    args: &[&str],
    input: &str,
) -> (String, String, bool) {
    let binary = chai_binary();
    let mut cmd = Command::new(&binary);
    cmd.current_dir(dir)
        .env_remove("GEMINI_API_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(key) = key {
        cmd.env("GEMINI_API_KEY", key);
    }
    cmd.args(args);

    let mut child = cmd
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to spawn chai binary at {:?}: {}", binary, e));
    {
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(input.as_bytes()).unwrap();
    }
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_ask_empty_question_prints_hint_without_key() {
    let tmp = TempDir::new().unwrap();
    let (stdout, _, success) = run_chai(tmp.path(), None, None, &["ask", ""]);
    assert!(success, "empty question should not need an API key");
    assert!(stdout.contains("Enter a query to get started."));
}

#[test]
fn test_ask_requires_api_key() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_chai(tmp.path(), None, None, &["ask", "what is html?"]);
    assert!(!success, "ask without a key should fail");
    assert!(
        stderr.contains("GEMINI_API_KEY"),
        "Should name the missing variable, got: {}",
        stderr
    );
}

#[test]
fn test_ingest_requires_api_key_even_for_dry_run() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_chai(tmp.path(), None, None, &["ingest", "--dry-run"]);
    assert!(!success, "dry-run without a key should fail");
    assert!(stderr.contains("GEMINI_API_KEY"));
}

#[test]
fn test_ingest_unknown_domain() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_chai(tmp.path(), None, None, &["ingest", "--domain", "rust"]);
    assert!(!success, "Unknown domain should fail");
    assert!(stderr.contains("Unknown domain"));
    assert!(
        stderr.contains("html, django, sql"),
        "Should list available domains, got: {}",
        stderr
    );
}

#[test]
fn test_search_empty_query() {
    let tmp = TempDir::new().unwrap();
    let (stdout, _, success) = run_chai(tmp.path(), None, None, &["search", ""]);
    assert!(success, "Empty query should not panic or need a key");
    assert!(stdout.contains("No results."));
}

#[test]
fn test_explicit_config_path_must_exist() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.toml");
    let (_, stderr, success) = run_chai(tmp.path(), Some(&missing), None, &["status"]);
    assert!(!success, "Missing explicit config should fail");
    assert!(stderr.contains("Config file not found"));
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("chai.toml");
    fs::write(
        &config_path,
        "[chunking]\nchunk_size = 100\nchunk_overlap = 100\n",
    )
    .unwrap();

    let (_, stderr, success) = run_chai(tmp.path(), Some(&config_path), None, &["search", ""]);
    assert!(!success, "Overlap equal to chunk size should be rejected");
    assert!(stderr.contains("chunk_overlap"));
}

#[test]
fn test_default_config_path_is_used() {
    let tmp = TempDir::new().unwrap();
    let config_dir = tmp.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    // Unreachable store: status should still succeed and report it.
    fs::write(
        config_dir.join("chai.toml"),
        r#"[qdrant]
url = "http://127.0.0.1:1"
timeout_secs = 2

[[domains]]
name = "notes"
collection = "notes_docs"
label = "Notes"
urls = ["https://example.com/notes/"]
"#,
    )
    .unwrap();

    let (stdout, _, success) = run_chai(tmp.path(), None, None, &["status"]);
    assert!(success, "status must not fail on an unreachable store");
    assert!(stdout.contains("notes_docs"));
    assert!(stdout.contains("unreachable"));
}

#[test]
fn test_status_reports_unreachable_store() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("chai.toml");
    fs::write(
        &config_path,
        "[qdrant]\nurl = \"http://127.0.0.1:1\"\ntimeout_secs = 2\n",
    )
    .unwrap();

    let (stdout, _, success) = run_chai(tmp.path(), Some(&config_path), None, &["status"]);
    assert!(success);
    assert!(stdout.contains("html_docs"));
    assert!(stdout.contains("django_docs"));
    assert!(stdout.contains("sql_docs"));
    assert!(stdout.contains("unreachable"));
}

#[test]
fn test_interactive_ask_hints_on_empty_line() {
    let tmp = TempDir::new().unwrap();
    // One empty line, then EOF. Nothing is retrieved or generated, so a
    // dummy key is enough.
    let (stdout, _, success) = run_chai_with_stdin(tmp.path(), Some("test-key"), &["ask"], "\n");
    assert!(success, "empty line then EOF should exit cleanly");
    assert!(stdout.contains("Enter a query to get started."));
}
