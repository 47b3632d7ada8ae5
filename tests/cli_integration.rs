//! Integration tests for the ticket-desk binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use ticket_desk::auth::password;

const SECRET: &str = "cli-integration-secret-0123456789abcdef";

fn write_config(temp_dir: &TempDir, with_secret: bool) -> PathBuf {
    let hash = password::hash_password_with_cost("bob123", 1024, 1, 1).unwrap();
    let secret = if with_secret {
        format!("jwt_secret = \"{SECRET}\"\n")
    } else {
        String::new()
    };
    let path = temp_dir.path().join("ticket-desk.toml");
    fs::write(
        &path,
        format!(
            "[auth]\n{secret}\n[[users]]\nusername = \"bob\"\npassword_hash = \"{hash}\"\nrole = \"agent\"\n"
        ),
    )
    .unwrap();
    path
}

#[allow(deprecated)]
fn ticket_desk() -> Command {
    let mut cmd = Command::cargo_bin("ticket-desk").unwrap();
    cmd.env_remove("TICKET_DESK_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    ticket_desk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hash-password"))
        .stdout(predicate::str::contains("token"));
}

#[test]
fn test_hash_password_output_verifies() {
    let output = ticket_desk()
        .args(["hash-password", "s3cret"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$argon2id$"))
        .get_output()
        .stdout
        .clone();

    let hash = String::from_utf8(output).unwrap();
    assert!(password::verify_password("s3cret", hash.trim()).unwrap());
    assert!(!password::verify_password("other", hash.trim()).unwrap());
}

#[test]
fn test_hash_password_json() {
    ticket_desk()
        .args(["--json", "hash-password", "s3cret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"password_hash\""));
}

#[test]
fn test_token_for_configured_user() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, true);

    let output = ticket_desk()
        .arg("--config")
        .arg(&config)
        .args(["token", "bob", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let body: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(body["role"], "agent");
    let token = body["access_token"].as_str().unwrap();

    let issuer = ticket_desk::auth::TokenIssuer::new(SECRET.as_bytes()).unwrap();
    let principal = issuer.verify(token).unwrap();
    assert_eq!(principal, ticket_desk::auth::Principal::agent("bob"));
}

#[test]
fn test_token_for_unknown_user_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, true);

    ticket_desk()
        .arg("--config")
        .arg(&config)
        .args(["token", "mallory"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid username, password or role"));
}

#[test]
fn test_token_rejects_out_of_range_ttl() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, true);

    for ttl in ["0", "9223372036854775807", "1000000000000"] {
        ticket_desk()
            .arg("--config")
            .arg(&config)
            .args(["token", "bob", "--ttl-minutes", ttl])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--ttl-minutes must be between"));
    }
}

#[test]
fn test_token_requires_fixed_secret() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, false);

    ticket_desk()
        .arg("--config")
        .arg(&config)
        .args(["token", "bob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("jwt_secret"));
}

#[test]
fn test_missing_config_file_fails() {
    ticket_desk()
        .args(["--config", "/nonexistent/ticket-desk.toml", "token", "bob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
