//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data
//! directory and checks the JSON it prints.

use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_momentum"))
        .args(args)
        .env("MOMENTUM_DATA_DIR", dir.path())
        .env_remove("MOMENTUM_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command, expect success and parse its JSON output.
fn run_json(dir: &TempDir, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_task_lifecycle_awards_points() {
    let dir = TempDir::new().unwrap();

    let added = run_json(&dir, &["task", "add", "Write report", "--priority", "high"]);
    let id = added["value"]["id"].as_str().unwrap().to_string();
    assert_eq!(added["value"]["priority"], "high");
    assert_eq!(added["value"]["type"], "moderate");

    let toggled = run_json(&dir, &["task", "toggle", &id]);
    assert_eq!(toggled["value"]["completed"], true);

    let list = run_json(&dir, &["task", "list"]);
    assert_eq!(list["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(list["summary"]["completed"], 1);

    let rewards = run_json(&dir, &["reward", "list"]);
    assert_eq!(rewards["balance"], 15);

    let removed = run_json(&dir, &["task", "remove", &id]);
    assert_eq!(removed["removed"], true);
    let removed = run_json(&dir, &["task", "remove", &id]);
    assert_eq!(removed["removed"], false);
}

#[test]
fn test_empty_title_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["task", "add", "   "]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Title must not be empty"));
}

#[test]
fn test_streak_starts_at_one() {
    let dir = TempDir::new().unwrap();
    let streak = run_json(&dir, &["streak", "show"]);
    assert_eq!(streak["count"], 1);
    let again = run_json(&dir, &["streak", "show"]);
    assert_eq!(again["count"], 1);
    assert_eq!(again["change"], "unchanged");
}

#[test]
fn test_usage_limit_crossing() {
    let dir = TempDir::new().unwrap();
    run_json(&dir, &["usage", "limit", "30"]);

    let first = run_json(&dir, &["usage", "add", "20"]);
    assert_eq!(first["value"]["limit_reached_now"], false);
    let second = run_json(&dir, &["usage", "add", "15"]);
    assert_eq!(second["value"]["limit_reached_now"], true);
    assert_eq!(second["events"][0]["type"], "usage_limit_reached");

    let status = run_json(&dir, &["usage", "status"]);
    assert_eq!(status["today_minutes"], 35);
    assert_eq!(status["level"], "exceeded");

    let history = run_json(&dir, &["usage", "history", "--days", "3"]);
    assert_eq!(history.as_array().unwrap().len(), 3);
    assert_eq!(history[2]["minutes"], 35);

    let reset = run_json(&dir, &["usage", "reset"]);
    assert_eq!(reset["today_minutes"], 0);
    assert_eq!(reset["limit_reached"], false);

    let (_, _, code) = run_cli(&dir, &["usage", "add", "0"]);
    assert_ne!(code, 0);
}

#[test]
fn test_reward_claims() {
    let dir = TempDir::new().unwrap();

    let short = run_json(&dir, &["reward", "claim", "3"]);
    assert_eq!(short["value"]["outcome"], "insufficient_points");

    run_json(&dir, &["reward", "add", "150"]);
    let pending = run_json(&dir, &["reward", "claim", "1"]);
    assert_eq!(pending["value"]["outcome"], "pending");

    let blocked = run_json(&dir, &["reward", "claim", "2"]);
    assert_eq!(blocked["value"]["outcome"], "already_pending");

    let instant = run_json(&dir, &["reward", "claim", "3"]);
    assert_eq!(instant["value"]["outcome"], "already_pending");

    let polled = run_json(&dir, &["reward", "poll"]);
    assert!(polled["value"].is_null());

    let list = run_json(&dir, &["reward", "list"]);
    assert_eq!(list["balance"], 50);
    assert_eq!(list["pending"]["reward"]["id"], "1");
    assert_eq!(list["minutesUntilReady"], 15);

    let (_, _, code) = run_cli(&dir, &["reward", "claim", "nope"]);
    assert_ne!(code, 0);
}

#[test]
fn test_focus_session_via_ticks() {
    let dir = TempDir::new().unwrap();

    let started = run_json(&dir, &["focus", "start", "--secs", "2"]);
    assert_eq!(started["value"]["state"], "running");

    run_json(&dir, &["focus", "pause"]);
    let (_, _, code) = run_cli(&dir, &["focus", "tick"]);
    assert_ne!(code, 0, "tick while paused must fail");
    run_json(&dir, &["focus", "resume"]);

    run_json(&dir, &["focus", "tick"]);
    let done = run_json(&dir, &["focus", "tick"]);
    assert_eq!(done["value"]["state"], "complete");
    assert!(done["events"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["type"] == "points_awarded" && e["amount"] == 25));

    let rest = run_json(&dir, &["focus", "ack"]);
    assert_eq!(rest["value"]["state"], "running");
    assert_eq!(rest["value"]["remaining_secs"], 300);

    let ended = run_json(&dir, &["rest", "end"]);
    assert_eq!(ended["value"]["state"], "idle");
    let status = run_json(&dir, &["focus", "status"]);
    assert_eq!(status["session"]["state"], "idle");
}

#[test]
fn test_focus_run_completes_in_foreground() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(&dir, &["config", "set", "focus.tick_ms", "10"]);
    assert_eq!(code, 0);

    let (stdout, stderr, code) = run_cli(&dir, &["focus", "run", "--secs", "3"]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stdout.contains("session_completed"));

    let status = run_json(&dir, &["focus", "status"]);
    assert_eq!(status["session"]["state"], "complete");
}

#[test]
fn test_mood_commands() {
    let dir = TempDir::new().unwrap();

    let report = run_json(&dir, &["mood", "classify", "I feel great and happy today"]);
    assert_eq!(report["classification"]["mood"], "positive");
    assert_eq!(report["next_step"]["action"], "create_any_task");

    let suggestion = run_json(&dir, &["mood", "suggest", "negative"]);
    assert_eq!(
        suggestion["suggestion"]["message"],
        "It's okay to feel down. Let's start with something small."
    );

    let (_, _, code) = run_cli(&dir, &["mood", "suggest", "ecstatic"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(&dir, &["config", "get", "points.task_completed"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10");

    let (_, _, code) = run_cli(&dir, &["config", "set", "points.task_completed", "40"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&dir, &["config", "get", "points.task_completed"]);
    assert_eq!(stdout.trim(), "40");

    let (_, _, code) = run_cli(&dir, &["config", "set", "focus.focus_secs", "0"]);
    assert_ne!(code, 0);
    let (_, _, code) = run_cli(&dir, &["config", "get", "no.such.key"]);
    assert_ne!(code, 0);

    let list = run_json(&dir, &["config", "list"]);
    assert_eq!(list["focus"]["rest_secs"], 300);
}

#[test]
fn test_hand_edited_zero_period_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[rewards]\npoll_secs = 0\n").unwrap();

    let (_, stderr, code) = run_cli(&dir, &["reward", "watch"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("rewards.poll_secs"), "{stderr}");

    std::fs::write(dir.path().join("config.toml"), "[focus]\ntick_ms = 0\n").unwrap();
    let (_, stderr, code) = run_cli(&dir, &["focus", "run", "--secs", "2"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("focus.tick_ms"), "{stderr}");
}

#[test]
fn test_usage_history_window_is_bounded() {
    let dir = TempDir::new().unwrap();

    let (_, stderr, code) = run_cli(&dir, &["usage", "history", "--days", "150000000"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("days"), "{stderr}");

    let history = run_json(&dir, &["usage", "history", "--days", "3660"]);
    assert_eq!(history.as_array().unwrap().len(), 3660);
}
