//! Integration tests for register, login, logout and route guards.


use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixtures::{PASSWORD, read_storage, seed_session};

#[tokio::test]
async fn test_login_stores_session() {
    let home = tempdir().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": PASSWORD })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-1",
            "user": { "name": "Ada", "email": "ada@example.com" },
            "message": "Login successful"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .env("TODO_API_URL", mock_server.uri())
        .args(["login", "--email", "ada@example.com", "--password", PASSWORD])
        .assert()
        .success()
        .stdout(predicate::str::contains("Login successful"))
        .stdout(predicate::str::contains("Logged in as Ada"));

    let storage = read_storage(home.path()).expect("storage.json should exist");
    assert_eq!(storage["token"], "tok-1");
    let user: serde_json::Value =
        serde_json::from_str(storage["user"].as_str().unwrap()).unwrap();
    assert_eq!(user["name"], "Ada");
}

#[tokio::test]
async fn test_login_reads_password_from_stdin() {
    let home = tempdir().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": PASSWORD })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-1",
            "user": { "name": "Ada" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .env("TODO_API_URL", mock_server.uri())
        .env_remove("TODO_PASSWORD")
        .args(["login", "--email", "ada@example.com"])
        .write_stdin(format!("{PASSWORD}\n"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as Ada"));
}

#[tokio::test]
async fn test_login_rejected_leaves_session_empty() {
    let home = tempdir().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .env("TODO_API_URL", mock_server.uri())
        .args(["login", "--email", "ada@example.com", "--password", PASSWORD])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid email or password"));

    assert!(read_storage(home.path()).is_none());
}

#[tokio::test]
async fn test_login_invalid_email_sends_nothing() {
    let home = tempdir().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .env("TODO_API_URL", mock_server.uri())
        .args(["login", "--email", "not-an-email", "--password", PASSWORD])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid email address"));
}

#[tokio::test]
async fn test_register_duplicate_account_points_to_login() {
    let home = tempdir().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/signup"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "user already exsist" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .env("TODO_API_URL", mock_server.uri())
        .args([
            "register",
            "--name",
            "Ada Lovelace",
            "--email",
            "ada@example.com",
            "--password",
            PASSWORD,
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("user already exsist"))
        .stdout(predicate::str::contains("todo login --email ada@example.com"));

    assert!(read_storage(home.path()).is_none());
}

#[tokio::test]
async fn test_register_password_mismatch_sends_nothing() {
    let home = tempdir().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .env("TODO_API_URL", mock_server.uri())
        .args([
            "register",
            "--name",
            "Ada Lovelace",
            "--email",
            "ada@example.com",
            "--password",
            PASSWORD,
            "--confirm-password",
            "Other1!x",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Passwords don't match"));
}

#[test]
fn test_logout_clears_session_and_guards_tasks() {
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-1", "Ada");

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    let storage = read_storage(home.path()).unwrap();
    assert!(storage.get("token").is_none());
    assert!(storage.get("user").is_none());

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .args(["tasks", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Redirected to /login"));
}

#[test]
fn test_logout_when_not_logged_in() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn test_login_view_redirects_when_logged_in() {
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-1", "Ada");

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .args(["open", "/login"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Redirected to / (from /login)"))
        .stderr(predicate::str::contains("todo logout"));
}

#[test]
fn test_profile_shows_stored_user() {
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-1", "Ada");

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .arg("profile")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada"))
        .stdout(predicate::str::contains("ada@example.com"));
}

#[test]
fn test_profile_requires_login() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .args(["open", "/profile"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Redirected to /login (from /profile)"));
}

#[test]
fn test_partial_session_counts_as_logged_out() {
    let home = tempdir().unwrap();
    std::fs::write(home.path().join("storage.json"), r#"{"token":"tok-1"}"#).unwrap();

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .arg("profile")
        .assert()
        .code(3);
}

#[test]
fn test_unknown_path_renders_not_found() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("todo")
        .env("TODO_HOME", home.path())
        .args(["open", "/nope"])
        .assert()
        .success()
        .stdout(predicate::str::contains("404"));
}
