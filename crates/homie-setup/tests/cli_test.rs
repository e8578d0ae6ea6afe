//! Integration tests for the `homie-setup` CLI binary.
//!
//! Argument parsing, settings management and offline generation run
//! against an isolated HOME; device commands run against wiremock.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `homie-setup` binary with env isolation.
///
/// Clears all `HOMIE_SETUP_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn homie_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("homie-setup");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("HOMIE_SETUP_DEVICE")
        .env_remove("HOMIE_SETUP_URL")
        .env_remove("HOMIE_SETUP_PROXY")
        .env_remove("HOMIE_SETUP_WIFI_PASSWORD")
        .env_remove("HOMIE_SETUP_MQTT_PASSWORD");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a prepared command off the async runtime so the mock server keeps
/// serving while the binary waits on it.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn device_cmd(home: &Path, server: &MockServer, args: &[&str]) -> assert_cmd::Command {
    let mut cmd = homie_cmd(home);
    cmd.args(["--url", &server.uri(), "--timeout", "2000"]).args(args);
    cmd
}

fn full_generate_args() -> Vec<&'static str> {
    vec![
        "generate",
        "--name",
        "Kitchen light",
        "--device-id",
        "kitchen-light",
        "--ssid",
        "Home",
        "--wifi-password",
        "secret",
        "--mqtt-host",
        "broker.local",
    ]
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = homie_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    homie_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("Homie")
            .and(predicate::str::contains("heartbeat"))
            .and(predicate::str::contains("networks"))
            .and(predicate::str::contains("wizard")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    homie_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("homie-setup"));
}

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    homie_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    homie_cmd(home.path())
        .args(["-o", "xml", "heartbeat"])
        .assert()
        .code(2);
}

// ── Settings ────────────────────────────────────────────────────────

#[test]
fn test_config_path_is_under_home() {
    let home = tempfile::tempdir().unwrap();
    let output = homie_cmd(home.path()).args(["config", "path"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().ends_with("config.toml"), "unexpected path: {stdout}");
}

#[test]
fn test_set_device_then_show() {
    let home = tempfile::tempdir().unwrap();
    homie_cmd(home.path())
        .args(["--url", "192.168.123.1", "--timeout", "5000", "config", "set-device", "kitchen"])
        .assert()
        .success();

    homie_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[devices.kitchen]")
                .and(predicate::str::contains("url = \"192.168.123.1\""))
                .and(predicate::str::contains("timeout_ms = 5000"))
                .and(predicate::str::contains("default_device = \"kitchen\"")),
        );
}

#[test]
fn test_set_device_requires_url() {
    let home = tempfile::tempdir().unwrap();
    homie_cmd(home.path())
        .args(["config", "set-device", "kitchen"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn test_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    let output = homie_cmd(home.path())
        .args(["--device", "garage", "heartbeat"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("garage"));
}

#[test]
fn test_tls_url_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    homie_cmd(home.path())
        .args(["--url", "https://192.168.123.1", "heartbeat"])
        .assert()
        .code(2);
}

// ── Generate ────────────────────────────────────────────────────────

#[test]
fn test_generate_prints_document() {
    let home = tempfile::tempdir().unwrap();
    let output = homie_cmd(home.path()).args(full_generate_args()).output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        doc,
        json!({
            "name": "Kitchen light",
            "device_id": "kitchen-light",
            "wifi": { "ssid": "Home", "password": "secret" },
            "mqtt": {
                "host": "broker.local",
                "port": 1883,
                "base_topic": "devices/",
                "auth": false
            },
            "ota": {
                "enabled": false,
                "host": "broker.local",
                "port": 80,
                "path": "/ota"
            }
        })
    );
}

#[test]
fn test_generate_requires_wifi_password() {
    let home = tempfile::tempdir().unwrap();
    homie_cmd(home.path())
        .args(["generate", "--ssid", "Home", "--mqtt-host", "broker.local"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("wifi_password is empty"));
}

#[test]
fn test_generate_to_file_and_remember() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("device.json");

    let mut args = full_generate_args();
    args.extend(["--remember", "--out"]);
    homie_cmd(home.path())
        .args(args)
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(doc["device_id"], "kitchen-light");
}

#[test]
fn test_push_rejects_incomplete_document() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("bad.json");
    std::fs::write(&file, r#"{"name": "x"}"#).unwrap();

    homie_cmd(home.path())
        .args(["--url", "127.0.0.1:9", "--yes", "push"])
        .arg(&file)
        .assert()
        .code(2);
}

// ── Device commands ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_heartbeat_alive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/heart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"heart": "beat"})))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run(device_cmd(home.path(), &server, &["heartbeat"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("alive"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_heartbeat_wrong_device() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/heart"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run(device_cmd(home.path(), &server, &["heartbeat"])).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_networks_sorted_by_signal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/networks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "networks": [
                { "ssid": "Weak", "rssi": -85, "encryption": "wpa2" },
                { "ssid": "Strong", "rssi": -40, "encryption": "none" },
                { "ssid": "Middle", "rssi": -66, "encryption": "wep" }
            ]
        })))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run(device_cmd(home.path(), &server, &["-o", "plain", "networks"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Strong\nMiddle\nWeak\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_networks_scan_not_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/networks"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(json!({"error": "Initial Wi-Fi scan not finished yet"})),
        )
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run(device_cmd(home.path(), &server, &["networks"])).await;
    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("scan"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_push_sends_document() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/config"))
        .and(body_string_contains("\"device_id\":\"kitchen-light\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("device.json");
    let mut args = full_generate_args();
    args.push("--out");
    homie_cmd(home.path()).args(args).arg(&file).assert().success();

    let mut cmd = device_cmd(home.path(), &server, &["--yes", "push"]);
    cmd.arg(&file);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_push_already_configured() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "error": "Device already configured"
        })))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("device.json");
    let mut args = full_generate_args();
    args.push("--out");
    homie_cmd(home.path()).args(args).arg(&file).assert().success();

    let mut cmd = device_cmd(home.path(), &server, &["--yes", "push"]);
    cmd.arg(&file);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_proxy_on() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/proxy-control"))
        .and(body_string_contains("enable=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "proxy-enabled"})))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run(device_cmd(home.path(), &server, &["-o", "plain", "proxy", "on"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "proxy-enabled");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wifi_connect_waits_for_connection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wifi-connect"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wifi-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "connected"})))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run(device_cmd(
        home.path(),
        &server,
        &["-o", "plain", "wifi-connect", "Home", "--password", "secret", "--wait", "5"],
    ))
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "connected");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wifi_connect_failure_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wifi-connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wifi-status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "connect_failed"})),
        )
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run(device_cmd(
        home.path(),
        &server,
        &["wifi-connect", "Home", "--password", "wrong", "--wait", "5"],
    ))
    .await;
    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
}

#[test]
fn test_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let home = tempfile::tempdir().unwrap();
    let output = homie_cmd(home.path())
        .args(["--url", &format!("http://{addr}"), "heartbeat"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}
