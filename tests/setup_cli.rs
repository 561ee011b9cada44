//! Integration tests for the setup command

#![cfg(unix)]

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

mod common;
use common::{fake_tool, tutor_cmd};

fn checkout_with_template() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".env.example"), "GROQ_API_KEY=\n").unwrap();
    temp
}

#[test]
fn test_setup_fails_without_docker_compose() {
    let temp = checkout_with_template();
    let tools = TempDir::new().unwrap();
    fake_tool(tools.path(), "docker");

    tutor_cmd()
        .current_dir(temp.path())
        .env("PATH", tools.path())
        .arg("setup")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("docker-compose"));

    // A failed prerequisite check must leave the checkout untouched.
    assert!(!temp.path().join("data").exists());
    assert!(!temp.path().join("storage").exists());
    assert!(!temp.path().join(".env").exists());
}

#[test]
fn test_setup_creates_dirs_and_env() {
    let temp = checkout_with_template();
    let tools = TempDir::new().unwrap();
    fake_tool(tools.path(), "docker");
    fake_tool(tools.path(), "docker-compose");

    tutor_cmd()
        .current_dir(temp.path())
        .env("PATH", tools.path())
        .arg("setup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Setup complete"));

    assert!(temp.path().join("data").is_dir());
    assert!(temp.path().join("storage").is_dir());
    assert_eq!(
        fs::read_to_string(temp.path().join(".env")).unwrap(),
        "GROQ_API_KEY=\n"
    );
}

#[test]
fn test_setup_rerun_preserves_env_edits() {
    let temp = checkout_with_template();
    let tools = TempDir::new().unwrap();
    fake_tool(tools.path(), "docker");
    fake_tool(tools.path(), "docker-compose");

    tutor_cmd()
        .current_dir(temp.path())
        .env("PATH", tools.path())
        .arg("setup")
        .assert()
        .success();

    fs::write(temp.path().join(".env"), "GROQ_API_KEY=edited\n").unwrap();

    tutor_cmd()
        .current_dir(temp.path())
        .env("PATH", tools.path())
        .arg("setup")
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp.path().join(".env")).unwrap(),
        "GROQ_API_KEY=edited\n"
    );
}
