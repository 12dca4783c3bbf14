//! Binary smoke tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cookbook(storage: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cookbook").unwrap();
    cmd.env("COOKBOOK_ENV", "development")
        .env("COOKBOOK_STORAGE_PATH", storage.path().join("credentials.json"))
        .env_remove("COOKBOOK_BACKEND_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    cookbook(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("recipes"))
        .stdout(predicate::str::contains("token"));
}

#[test]
fn test_token_show_without_login() {
    let temp = TempDir::new().unwrap();
    cookbook(&temp)
        .args(["token", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No token stored"));
}

#[test]
fn test_token_show_json() {
    let temp = TempDir::new().unwrap();
    cookbook(&temp)
        .args(["--format", "json", "token", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"stored\":false"));
}

#[test]
fn test_token_clear() {
    let temp = TempDir::new().unwrap();
    cookbook(&temp)
        .args(["token", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Credentials cleared"));
}

#[test]
fn test_invalid_filter_fails() {
    let temp = TempDir::new().unwrap();
    cookbook(&temp)
        .args(["recipes", "--filter", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn test_invalid_timeout_is_config_error() {
    let temp = TempDir::new().unwrap();
    cookbook(&temp)
        .env("COOKBOOK_REQUEST_TIMEOUT", "soon")
        .arg("categories")
        .assert()
        .code(3);
}

#[test]
fn test_backend_override_keeps_env_errors() {
    let temp = TempDir::new().unwrap();
    cookbook(&temp)
        .env("COOKBOOK_REQUEST_TIMEOUT", "soon")
        .args(["--backend-url", "http://127.0.0.1:9", "token", "show"])
        .assert()
        .code(3);
}

#[test]
fn test_backend_override_keeps_storage_path() {
    let temp = TempDir::new().unwrap();
    let expected = temp.path().join("credentials.json");
    cookbook(&temp)
        .env("COOKBOOK_ENV", "production")
        .args([
            "--backend-url",
            "http://127.0.0.1:9",
            "--format",
            "json",
            "token",
            "show",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.to_string_lossy().into_owned()));
}
