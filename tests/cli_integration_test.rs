//! CLI integration tests: run the pfcheck binary.
//! Uses CARGO_BIN_EXE_pfcheck when set (e.g. by `cargo test`).

mod common;

use common::fake::FakeServer;
use common::fixtures::{EMAIL, PASSWORD};
use std::path::PathBuf;
use std::process::Command;

fn bin() -> Option<PathBuf> {
    std::env::var_os("CARGO_BIN_EXE_pfcheck").map(PathBuf::from)
}

/// The binary with no account or URL leaking in from the environment.
fn pfcheck(bin: &PathBuf) -> Command {
    let mut cmd = Command::new(bin);
    for var in [
        "PETFRIENDS_BASE_URL",
        "PETFRIENDS_EMAIL",
        "PETFRIENDS_PASSWORD",
        "PETFRIENDS_PHOTO",
        "PETFRIENDS_TIMEOUT_SECS",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_cli_help_succeeds() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let out = pfcheck(&bin).arg("--help").output().expect("run --help");
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("pfcheck"));
    assert!(stdout.contains("suite"));
}

#[test]
fn test_cli_lists_scenarios() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let out = pfcheck(&bin).arg("scenarios").output().expect("run scenarios");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 17);
    assert!(stdout.contains("update_nonexistent_pet"));
}

#[test]
fn test_cli_suite_fails_without_credentials() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let out = pfcheck(&bin)
        .args(["--base-url", "http://127.0.0.1:9", "suite"])
        .output()
        .expect("run suite");
    assert!(!out.status.success(), "expected failure without an account");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("PETFRIENDS_EMAIL"), "stderr: {stderr}");
}

#[test]
fn test_cli_rejects_unknown_scenario() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let out = pfcheck(&bin)
        .args(["--email", EMAIL, "--password", PASSWORD, "suite", "--only", "nope"])
        .output()
        .expect("run suite --only");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("nope"));
}

#[test]
fn test_cli_key_and_list_against_fake() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let server = FakeServer::start();
    let base = ["--base-url", server.base_url.as_str(), "--email", EMAIL, "--password", PASSWORD];

    let out = pfcheck(&bin).args(base).arg("key").output().expect("run key");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Status: 200"));

    let out = pfcheck(&bin)
        .args(base)
        .args(["add", "--name", "Мурка", "--animal-type", "кошка", "--age", "2"])
        .output()
        .expect("run add");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(server.service.pet_count(), 1);

    let out = pfcheck(&bin)
        .args(base)
        .args(["list", "--mine"])
        .output()
        .expect("run list");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Pets: 1"), "stdout: {stdout}");
    assert!(stdout.contains("Мурка"));
}
