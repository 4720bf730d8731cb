// domain-scan/tests/cli_integration.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from the user's config files and DS_* variables.
fn isolated_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("domain-scan").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG");
    for key in [
        "DS_LENGTH",
        "DS_SUFFIX",
        "DS_PATTERN",
        "DS_REGEX",
        "DS_WORKERS",
        "DS_DELAY",
        "DS_CONFIG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn test_help_lists_flags() {
    let mut cmd = Command::cargo_bin("domain-scan").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--length"))
        .stdout(predicate::str::contains("--suffix"))
        .stdout(predicate::str::contains("--pattern"))
        .stdout(predicate::str::contains("--regex-mode"))
        .stdout(predicate::str::contains("--show-registered"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_dry_run_prefix_filter() {
    let home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&home);
    cmd.args([
        "--dry-run",
        "-l",
        "2",
        "-s",
        ".ai",
        "-p",
        "D",
        "-r",
        "^a",
        "--regex-mode",
        "prefix",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("aa.ai\n"))
        .stdout(predicate::str::contains("az.ai"))
        .stdout(predicate::str::contains("ba.ai").not())
        .stdout(predicate::function(|out: &str| out.lines().count() == 26))
        .stderr(predicate::str::contains("26 candidates"));
}

#[test]
fn test_dry_run_suffix_without_dot() {
    let home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&home);
    cmd.args(["--dry-run", "-l", "1", "-s", "de", "-p", "d"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.de"))
        .stdout(predicate::str::contains("9.de"))
        .stdout(predicate::function(|out: &str| out.lines().count() == 10));
}

#[test]
fn test_dangerous_regex_rejected() {
    let home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&home);
    cmd.args(["--dry-run", "-l", "2", "-r", "(a+)+"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_invalid_pattern_rejected() {
    let home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&home);
    cmd.args(["--dry-run", "-l", "2", "-p", "x"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_zero_length_rejected() {
    let home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&home);
    cmd.args(["--dry-run", "-l", "0"]);

    cmd.assert().failure();
}

#[test]
fn test_worker_bounds_rejected() {
    let home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&home);
    cmd.args(["--dry-run", "-w", "101"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Workers must be between 1 and 100"));
}

#[test]
fn test_config_file_drives_dry_run() {
    let home = TempDir::new().unwrap();
    let config_path = home.path().join("scan.toml");
    fs::write(
        &config_path,
        r#"
[domain]
length = 2
suffix = "li"
pattern = "d"
regex_filter = "^1"
regex_mode = "prefix"
"#,
    )
    .unwrap();

    let mut cmd = isolated_cmd(&home);
    cmd.arg("--dry-run").arg("--config").arg(&config_path);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("10.li\n"))
        .stdout(predicate::str::contains("19.li"))
        .stdout(predicate::function(|out: &str| out.lines().count() == 10));
}

#[test]
fn test_cli_overrides_config_file() {
    let home = TempDir::new().unwrap();
    let config_path = home.path().join("scan.toml");
    fs::write(&config_path, "[domain]\nlength = 3\npattern = \"d\"\n").unwrap();

    let mut cmd = isolated_cmd(&home);
    cmd.arg("--dry-run")
        .arg("--config")
        .arg(&config_path)
        .args(["-l", "1", "-s", ".ch"]);

    cmd.assert()
        .success()
        .stdout(predicate::function(|out: &str| out.lines().count() == 10))
        .stdout(predicate::str::contains("5.ch"));
}

#[test]
fn test_env_overrides_config_file() {
    let home = TempDir::new().unwrap();
    let config_path = home.path().join("scan.toml");
    fs::write(&config_path, "[domain]\nlength = 3\npattern = \"d\"\n").unwrap();

    let mut cmd = isolated_cmd(&home);
    cmd.env("DS_CONFIG", &config_path)
        .env("DS_LENGTH", "1")
        .args(["--dry-run", "-s", ".ch"]);

    cmd.assert()
        .success()
        .stdout(predicate::function(|out: &str| out.lines().count() == 10));
}

#[test]
fn test_missing_config_file_fails() {
    let home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&home);
    cmd.args(["--dry-run", "--config", "does-not-exist.toml"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}
