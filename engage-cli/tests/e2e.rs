//! End-to-end integration tests for engage-cli
//!
//! Gated behind the `integration` feature flag. Run with:
//!
//! ```sh
//! cargo test -p engage-cli --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

fn engage(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_engage"))
        .arg("--store")
        .arg(store)
        .args(args)
        .env("ENGAGE_PROJECT_CONFIG_DIR", store.parent().unwrap_or(store))
        .output()
        .expect("Failed to run engage")
}

fn lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

/// Test that engage --help lists the subcommands
#[test]
fn engage_help_works() {
    let output = Command::new(env!("CARGO_BIN_EXE_engage"))
        .arg("--help")
        .output()
        .expect("Failed to run engage --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("reconcile"));
    assert!(stdout.contains("route"));
    assert!(stdout.contains("extension"));
}

/// Registration persists across invocations
#[test]
fn register_then_status() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store.json");

    let output = engage(&store, &["register", "ab12"]);
    assert!(output.status.success());
    let events = lines(&output);
    assert!(events.iter().any(|e| e["event"] == json!("Registered for Push")));

    let output = engage(&store, &["status"]);
    assert!(output.status.success());
    assert_eq!(lines(&output)[0]["device_token"], json!("ab12"));
}

/// A default tap on a deep link prints the open signal
#[test]
fn route_deep_link() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store.json");
    let payload = tmp.path().join("payload.json");
    std::fs::write(&payload, r#"{"link": "app://settings"}"#).unwrap();

    let output = engage(
        &store,
        &[
            "route",
            "--category",
            "deep_link",
            "--payload",
            payload.to_str().unwrap(),
        ],
    );

    assert!(output.status.success());
    let outcome = lines(&output)
        .into_iter()
        .find(|line| line.get("outcome").is_some())
        .unwrap();
    assert_eq!(outcome["outcome"], json!("open"));
    assert_eq!(outcome["signal"]["deep_link"], json!("app://settings"));
}

/// The extension increments the shared badge
#[test]
fn extension_sets_badge() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store.json");
    let payload = tmp.path().join("payload.json");
    std::fs::write(&payload, r#"{"badgeAmount": 3, "badgeStrategy": "inc"}"#).unwrap();

    let output = engage(&store, &["extension", "--payload", payload.to_str().unwrap()]);

    assert!(output.status.success());
    let content = lines(&output)
        .into_iter()
        .find(|line| line["type"] == json!("content"))
        .unwrap();
    assert_eq!(content["content"]["badge"], json!(3));
}
