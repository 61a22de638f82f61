//! Integration tests for the CLI binary
//!
//! Runs the built binary and checks argument handling and exit codes without
//! a live server.

use std::process::{Command, Output};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sgweather-cli"));
    cmd.env_remove("SGWEATHER_URL");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = cli().arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["dashboard", "forecast", "nearest", "health"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn version_flag() {
    let output = cli().arg("--version").output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn nearest_without_coordinates_is_usage_error() {
    let output = cli().args(["nearest", "--latitude", "1.3"]).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--longitude"));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = cli().arg("chat").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn health_against_unreachable_server_fails() {
    let output = cli()
        .args(["health", "--url", "http://127.0.0.1:1"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Unhealthy"));
}

#[test]
fn dashboard_against_unreachable_server_reports_error() {
    let output = cli()
        .args(["dashboard", "--url", "http://127.0.0.1:1"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Could not reach"));
}

async fn run(args: Vec<String>) -> Output {
    tokio::task::spawn_blocking(move || cli().args(args).output().unwrap())
        .await
        .unwrap()
}

async fn ready_server(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ready"))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "ready": status == 200,
            "services": { "nea": { "healthy": status == 200 } },
            "checked_at": "2024-07-15T06:00:00Z"
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn health_json_prints_only_the_body() {
    let server = ready_server(200).await;

    let output = run(vec!["health".into(), "--json".into(), "--url".into(), server.uri()]).await;

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn health_json_keeps_failure_exit_code() {
    let server = ready_server(503).await;

    let output = run(vec!["health".into(), "--json".into(), "--url".into(), server.uri()]).await;

    assert_eq!(output.status.code(), Some(1));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["ready"], false);
}

#[tokio::test]
async fn health_text_ends_with_summary() {
    let server = ready_server(200).await;

    let output = run(vec!["health".into(), "--url".into(), server.uri()]).await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("nea: ok"));
    assert!(stdout.trim_end().ends_with("Healthy"));
}
