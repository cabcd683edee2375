//! Exit code and error-stream alignment for the probectl binary
//!
//! Each test triggers one outcome and checks both the process exit code and
//! the `Error:` block on stderr. Telemetry is forced off and the config
//! directory points at a temp dir so no test touches the network or the real
//! user configuration, except for the loopback servers started here.

use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::process::Command;
use std::thread;
use tempfile::TempDir;

fn probectl(config_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("probectl"));
    cmd.env("PROBECTL_TELEMETRY", "off")
        .env("PROBECTL_CONFIG_DIR", config_dir.path())
        .env_remove("PROBECTL_DEBUG")
        .env_remove("PROBECTL_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Serve exactly one canned HTTP response on loopback; returns the base URL.
fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{addr}")
}

#[test]
fn test_success_exits_zero() {
    let dir = TempDir::new().unwrap();
    probectl(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_invalid_output_format_is_misuse_with_suggestion() {
    let dir = TempDir::new().unwrap();
    probectl(&dir)
        .args(["version", "--output", "yml"])
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("Error: invalid output format \"yml\""))
        .stderr(predicate::str::contains("  Did you mean \"yaml\"?"))
        .stderr(predicate::str::contains("  Valid options: table, json, yaml"));
}

#[test]
fn test_unknown_subcommand_is_misuse() {
    let dir = TempDir::new().unwrap();
    probectl(&dir).arg("pnig").assert().code(2);
}

#[test]
fn test_unreachable_api_is_network() {
    let dir = TempDir::new().unwrap();
    probectl(&dir)
        .env("PROBECTL_API_URL", "http://127.0.0.1:9")
        .args(["ping", "--timeout", "5"])
        .assert()
        .code(8)
        .stderr(predicate::str::starts_with("Error: "))
        .stderr(predicate::str::contains("Error:").count(1));
}

#[test]
fn test_debug_lines_do_not_change_exit_code() {
    let dir = TempDir::new().unwrap();
    probectl(&dir)
        .env("PROBECTL_API_URL", "http://127.0.0.1:9")
        .env("PROBECTL_DEBUG", "1")
        .args(["ping", "--timeout", "5"])
        .assert()
        .code(8)
        .stderr(predicate::str::contains("Debug: classification:"));
}

#[test]
fn test_unauthorized_api_response() {
    let dir = TempDir::new().unwrap();
    let url = serve_once("401 Unauthorized", r#"{"code":"unauthorized"}"#);
    probectl(&dir)
        .env("PROBECTL_API_URL", url)
        .arg("ping")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Error: Authentication required"))
        .stderr(predicate::str::contains("login"));
}

#[test]
fn test_plan_limit_response_is_not_forbidden() {
    let dir = TempDir::new().unwrap();
    let url = serve_once(
        "403 Forbidden",
        r#"{"code":"plan_limit_exceeded","message":"probe quota used up"}"#,
    );
    probectl(&dir)
        .env("PROBECTL_API_URL", url)
        .arg("ping")
        .assert()
        .code(10);
}

#[test]
fn test_server_error_shows_request_id_once() {
    let dir = TempDir::new().unwrap();
    let url = serve_once(
        "500 Internal Server Error",
        r#"{"code":"internal_error","request_id":"req_abc"}"#,
    );
    probectl(&dir)
        .env("PROBECTL_API_URL", url)
        .arg("ping")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("  Request ID: req_abc"))
        .stderr(predicate::str::contains("Request ID:").count(1));
}

#[test]
fn test_healthy_api() {
    let dir = TempDir::new().unwrap();
    let url = serve_once("200 OK", r#"{"status":"ok","version":"2024.1"}"#);
    probectl(&dir)
        .env("PROBECTL_API_URL", url)
        .args(["ping", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"server_version\": \"2024.1\""));
}

#[test]
fn test_telemetry_status_reports_env_override() {
    let dir = TempDir::new().unwrap();
    probectl(&dir)
        .args(["telemetry", "status", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"enabled\": false"))
        .stdout(predicate::str::contains("\"source\": \"env\""));
}

#[test]
fn test_telemetry_disable_persists() {
    let dir = TempDir::new().unwrap();
    probectl(&dir)
        .args(["telemetry", "disable"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(saved.contains("telemetry = false"));

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("probectl"));
    cmd.env_remove("PROBECTL_TELEMETRY")
        .env("PROBECTL_CONFIG_DIR", dir.path())
        .args(["telemetry", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source       config"));
}
