//! Integration tests for the `devreg` CLI binary.
//!
//! Offline commands run against temporary payload files; registry-bound
//! commands run against a wiremock registry passed via `--registry`.
#![allow(clippy::unwrap_used)]

use std::io::Write as _;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `devreg` binary with env isolation.
///
/// Clears all `DEVREG_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn devreg_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("devreg");
    cmd.env("HOME", "/tmp/devreg-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/devreg-cli-test-nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("DEVREG_PROFILE")
        .env_remove("DEVREG_REGISTRY")
        .env_remove("DEVREG_TENANT")
        .env_remove("DEVREG_OUTPUT")
        .env_remove("DEVREG_INSECURE")
        .env_remove("DEVREG_TIMEOUT")
        .env_remove("DEVREG_PASSWORD");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn payload_file(contents: &serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(contents.to_string().as_bytes()).unwrap();
    file
}

fn psk_payload() -> serde_json::Value {
    json!([
        { "type": "psk", "auth-id": "sensor-1", "secrets": [{ "key": "c2VjcmV0" }] }
    ])
}

const CREDENTIALS_PATH: &str = "/v1/credentials/DEFAULT_TENANT/4711";

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = devreg_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    devreg_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("credentials")
            .and(predicate::str::contains("device"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    devreg_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("devreg"));
}

#[test]
fn test_config_path() {
    devreg_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Offline validation ──────────────────────────────────────────────

#[test]
fn test_credentials_validate_ok() {
    let file = payload_file(&psk_payload());
    devreg_cmd()
        .args(["credentials", "validate"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("psk").and(predicate::str::contains("sensor-1")));
}

#[test]
fn test_credentials_validate_json_output() {
    let file = payload_file(&psk_payload());
    let output = devreg_cmd()
        .args(["credentials", "validate", "-o", "json"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let rendered: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rendered, psk_payload());
}

#[test]
fn test_credentials_validate_missing_auth_id() {
    let file = payload_file(&json!([{ "type": "psk", "secrets": [] }]));
    let output = devreg_cmd()
        .args(["credentials", "validate"])
        .arg(file.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("field must be set"), "unexpected output:\n{text}");
}

#[test]
fn test_credentials_validate_rejects_non_array() {
    let file = payload_file(&json!({ "type": "psk" }));
    let output = devreg_cmd()
        .args(["credentials", "validate"])
        .arg(file.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("JSON array"), "unexpected output:\n{text}");
}

#[test]
fn test_device_validate_ok() {
    let file = payload_file(&json!({ "via": ["gw-1"] }));
    devreg_cmd()
        .args(["device", "validate", "-o", "json-compact"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"via":["gw-1"]}"#));
}

#[test]
fn test_device_validate_conflicting_relationships() {
    let file = payload_file(&json!({ "via": ["gw-1"], "memberOf": ["group-1"] }));
    let output = devreg_cmd()
        .args(["device", "validate"])
        .arg(file.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("must not be set"), "unexpected output:\n{text}");
}

// ── Registry-bound commands ─────────────────────────────────────────

#[test]
fn test_get_without_registry_is_a_usage_error() {
    let output = devreg_cmd()
        .args(["credentials", "get", "4711", "--tenant", "DEFAULT_TENANT"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("No registry configured"), "unexpected output:\n{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_requires_a_tenant() {
    let server = MockServer::start().await;
    let output = devreg_cmd()
        .args(["credentials", "get", "4711", "--registry", &server.uri()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("tenant"), "unexpected output:\n{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_credentials_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CREDENTIALS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "v3")
                .set_body_json(psk_payload()),
        )
        .expect(1)
        .mount(&server)
        .await;

    devreg_cmd()
        .args(["credentials", "get", "4711", "-t", "DEFAULT_TENANT"])
        .args(["--registry", &server.uri()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("sensor-1").and(predicate::str::contains("Version: v3")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CREDENTIALS_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let output = devreg_cmd()
        .args(["credentials", "get", "4711", "-t", "DEFAULT_TENANT"])
        .args(["--registry", &server.uri()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_sends_if_match() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(CREDENTIALS_PATH))
        .and(header("If-Match", "v3"))
        .respond_with(ResponseTemplate::new(204).insert_header("ETag", "v4"))
        .expect(1)
        .mount(&server)
        .await;

    let file = payload_file(&psk_payload());
    devreg_cmd()
        .args(["credentials", "set", "4711", "-t", "DEFAULT_TENANT", "--if-match", "v3"])
        .args(["--registry", &server.uri(), "-f"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Credentials updated (version v4)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_stale_version_is_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(CREDENTIALS_PATH))
        .respond_with(ResponseTemplate::new(412))
        .mount(&server)
        .await;

    let file = payload_file(&psk_payload());
    let output = devreg_cmd()
        .args(["credentials", "set", "4711", "-t", "DEFAULT_TENANT", "--if-match", "old"])
        .args(["--registry", &server.uri(), "-f"])
        .arg(file.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_invalid_payload_never_reaches_registry() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let file = payload_file(&json!([{ "type": "psk", "auth-id": "sensor-1", "secrets": [{}] }]));
    let output = devreg_cmd()
        .args(["credentials", "set", "4711", "-t", "DEFAULT_TENANT"])
        .args(["--registry", &server.uri(), "-f"])
        .arg(file.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}
