use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const TRANSCRIPT: &str = "Please fix the bug in <parser>\r\nCopilot: Sure, looking now\r\nReading file a.ts\r\nReading file b.ts\r\nReading file c.ts\r\nFound it in `c.ts`.\r\n";

fn chatpage() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("chatpage"));
    cmd.env_remove("RUST_LOG")
        .env_remove("CHATPAGE_OUTPUT_DIR")
        .env_remove("CHATPAGE_TITLE_PREFIX");
    cmd
}

#[test]
fn stdin_renders_page_to_stdout() {
    chatpage()
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<!DOCTYPE html>"))
        .stdout(predicate::str::contains("<title>Copilot Chat Export — "))
        .stdout(predicate::str::contains("<article class=\"turn user\">"))
        .stdout(predicate::str::contains("Please fix the bug in &lt;parser&gt;"))
        .stdout(predicate::str::contains(
            "<summary>Reading file… (3)</summary>",
        ))
        .stdout(predicate::str::contains(
            "<p>Sure, looking now Found it in <code>c.ts</code>.</p>",
        ))
        .stdout(predicate::str::contains(format!(
            "v{}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn dash_reads_stdin() {
    chatpage()
        .arg("-")
        .write_stdin("User: hi")
        .assert()
        .success()
        .stdout(predicate::str::contains("<p>hi</p>"));
}

#[test]
fn file_input_writes_output_path() {
    let temp = tempdir().expect("tempdir");
    let input = temp.path().join("chat.txt");
    fs::write(&input, TRANSCRIPT).expect("write");
    let output = temp.path().join("out/chat.html");

    chatpage()
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let html = fs::read_to_string(&output).expect("read output");
    assert!(html.contains("<article class=\"turn assistant\">"));
}

#[test]
fn save_uses_configured_output_dir() {
    let temp = tempdir().expect("tempdir");

    chatpage()
        .env("CHATPAGE_OUTPUT_DIR", temp.path())
        .arg("--save")
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::contains("copilot-chat-export-"))
        .stdout(predicate::str::contains(".html"));

    let saved: Vec<_> = fs::read_dir(temp.path())
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].starts_with("copilot-chat-export-"));
    assert!(!saved[0].contains(':'));
}

#[test]
fn title_prefix_comes_from_env() {
    chatpage()
        .env("CHATPAGE_TITLE_PREFIX", "Team Chat")
        .write_stdin("User: hi")
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1>Team Chat — "));
}

#[test]
fn explicit_title_and_summary() {
    chatpage()
        .args(["--title", "Bug & fix", "--summary", "Fixed **it**."])
        .write_stdin("User: hi")
        .assert()
        .success()
        .stdout(predicate::str::contains("<title>Bug &amp; fix</title>"))
        .stdout(predicate::str::contains(
            "<h2>Summary</h2><p>Fixed <strong>it</strong>.</p>",
        ));
}

#[test]
fn insights_file_supplies_title_and_summary() {
    let temp = tempdir().expect("tempdir");
    let insights = temp.path().join("insights.txt");
    fs::write(&insights, "Title: Parser bug hunt\nSummary: The parser was fixed.").expect("write");

    chatpage()
        .arg("--insights")
        .arg(&insights)
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::contains("<title>Parser bug hunt</title>"))
        .stdout(predicate::str::contains("<p>The parser was fixed.</p>"));
}

#[test]
fn unusable_insights_are_ignored() {
    let temp = tempdir().expect("tempdir");
    let insights = temp.path().join("insights.txt");
    fs::write(&insights, "model unavailable").expect("write");

    chatpage()
        .arg("--insights")
        .arg(&insights)
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::contains("class=\"summary\"").not())
        .stderr(predicate::str::contains("ignoring insights response"));
}

#[test]
fn turns_outputs_json() {
    chatpage()
        .arg("--turns")
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"role\": \"user\""))
        .stdout(predicate::str::contains("\"role\": \"assistant\""))
        .stdout(predicate::str::contains("\"label\": \"Copilot\""));
}

#[test]
fn prompt_outputs_insights_prompt() {
    chatpage()
        .arg("--prompt")
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Summarize this conversation transcript.",
        ))
        .stdout(predicate::str::contains("USER:\nPlease fix the bug in <parser>"));
}

#[test]
fn blank_input_is_an_error() {
    chatpage()
        .write_stdin("  \n\n ")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "error: no transcript text was captured",
        ));
}

#[test]
fn missing_input_file_is_an_error() {
    let temp = tempdir().expect("tempdir");

    chatpage()
        .arg(temp.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: i/o error on"));
}

#[test]
fn output_conflicts_with_save() {
    chatpage()
        .args(["--save", "--output", "x.html"])
        .write_stdin("User: hi")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn verbose_logs_to_stderr_only() {
    chatpage()
        .arg("--verbose")
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<!DOCTYPE html>"))
        .stderr(predicate::str::contains("segmented transcript"));
}
